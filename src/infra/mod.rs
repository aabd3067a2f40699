//! Infrastructure layer - External systems integration
//!
//! Database connections, SeaORM entities and repositories, and the account
//! store that coordinates repository access and transactions.

pub mod account_store;
pub mod db;
pub mod repositories;

pub use account_store::{AccountStore, Persistence, TxContext};
pub use db::{Database, Migrator};
pub use repositories::{
    LanguageRepository, LanguageStore, UserGroupRepository, UserGroupStore, UserMetaRepository,
    UserMetaStore, UserRepository, UserStore,
};

#[cfg(feature = "test-utils")]
pub use repositories::{
    MockLanguageRepository, MockUserGroupRepository, MockUserMetaRepository, MockUserRepository,
};
