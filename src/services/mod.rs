//! Application services layer - Use cases and business logic.
//!
//! The account service orchestrates the validation engine and the account
//! store to fulfill each use case. It depends on abstractions (traits) for
//! dependency inversion.

mod account_service;
pub mod container;
pub mod results;

pub use account_service::{AccountManager, AccountService};
pub use container::{ServiceContainer, Services};
pub use results::{LoginCheck, PasswordChangeCheck, ProfileUpdateCheck, RegistrationCheck};

#[cfg(feature = "test-utils")]
pub use container::MockServiceContainer;
