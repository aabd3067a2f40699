//! judge-accounts - Account lifecycle core for an online-judge platform.
//!
//! Registration, credential verification, password change and profile update,
//! backed by a relational store. This is a library boundary: the web request
//! layer consumes the [`services::AccountService`] trait; no HTTP plumbing
//! lives here.
//!
//! # Architecture Layers
//!
//! - **config**: Environment settings and domain constants
//! - **domain**: Entities, DTOs, format legality checks, credential digest
//! - **services**: Account use cases and per-use-case check structs
//! - **infra**: SeaORM entities, repositories, migrations, account store
//! - **utils**: Text filters for free-text profile fields
//! - **errors**: Centralized error handling
//!
//! Validation failures are reported as named booleans in check structs, not
//! as errors; [`errors::AppError`] covers store and infrastructure failures.

pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod utils;

// Re-export commonly used types at crate root
pub use config::Config;
pub use domain::{ProfileUpdate, Registration, User, UserGroup, UserMeta};
pub use errors::{AppError, AppResult};
pub use services::{AccountManager, AccountService, Services};
