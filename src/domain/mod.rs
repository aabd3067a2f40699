//! Domain layer - Core business entities and logic
//!
//! Contains the account entities, the legality predicates of the validation
//! engine, and the legacy credential digest. No infrastructure concerns.

pub mod digest;
pub mod user;
pub mod validation;

pub use user::{
    Language, NewUser, NewUserMeta, ProfileUpdate, Registration, User, UserGroup, UserMeta,
};
