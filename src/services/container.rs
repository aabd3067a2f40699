//! Service container - composition root for the account core.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{AccountManager, AccountService};
use crate::config::Config;
use crate::infra::Persistence;
use crate::utils::WordListFilter;

#[cfg(feature = "test-utils")]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(feature = "test-utils", automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get account service
    fn accounts(&self) -> Arc<dyn AccountService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    account_service: Arc<dyn AccountService>,
}

impl Services {
    pub fn new(account_service: Arc<dyn AccountService>) -> Self {
        Self { account_service }
    }

    /// Wire the account service over a database connection and config.
    pub fn from_connection(db: DatabaseConnection, config: &Config) -> Self {
        let store = Arc::new(Persistence::new(db));
        let word_filter = Arc::new(WordListFilter::new(config.sensitive_words.clone()));
        let account_service = Arc::new(AccountManager::new(store, word_filter));

        Self { account_service }
    }
}

impl ServiceContainer for Services {
    fn accounts(&self) -> Arc<dyn AccountService> {
        self.account_service.clone()
    }
}
