//! Repository traits and their SeaORM implementations.

pub mod entities;
mod reference_repository;
mod user_meta_repository;
mod user_repository;

pub use reference_repository::{
    LanguageRepository, LanguageStore, UserGroupRepository, UserGroupStore,
};
pub use user_meta_repository::{TxUserMetaStore, UserMetaRepository, UserMetaStore};
pub use user_repository::{TxUserStore, UserRepository, UserStore};

#[cfg(feature = "test-utils")]
pub use reference_repository::{MockLanguageRepository, MockUserGroupRepository};
#[cfg(feature = "test-utils")]
pub use user_meta_repository::MockUserMetaRepository;
#[cfg(feature = "test-utils")]
pub use user_repository::MockUserRepository;
