//! Account store: centralized repository access and transaction management.
//!
//! Each mutating use case runs its write phase inside one transaction so a
//! user row and its metadata entries land together or not at all. Validation
//! reads happen outside the transaction; the check-then-act window on
//! username/email is closed by the unique constraints in the schema, not by
//! application-level locking.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::sync::Arc;

use super::repositories::{
    LanguageRepository, LanguageStore, TxUserMetaStore, TxUserStore, UserGroupRepository,
    UserGroupStore, UserMetaRepository, UserMetaStore, UserRepository, UserStore,
};
use crate::errors::{AppError, AppResult};

/// Repository access within one transaction.
///
/// Only the repositories that use cases mutate are exposed here; reference
/// data is read-only and never needs transactional access.
pub struct TxContext<'a> {
    pub users: &'a dyn UserRepository,
    pub user_metas: &'a dyn UserMetaRepository,
}

/// Persistence gateway trait for dependency injection.
///
/// The `transaction` method is generic, so this trait is consumed as a
/// generic bound rather than a trait object; tests implement it over mocks.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get user metadata repository
    fn user_metas(&self) -> Arc<dyn UserMetaRepository>;

    /// Get user group repository
    fn user_groups(&self) -> Arc<dyn UserGroupRepository>;

    /// Get language repository
    fn languages(&self) -> Arc<dyn LanguageRepository>;

    /// Execute a closure within a transaction.
    ///
    /// Committed on `Ok`, rolled back on `Err`.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TxContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Concrete implementation of AccountStore over a SeaORM connection pool.
pub struct Persistence {
    db: DatabaseConnection,
    users: Arc<UserStore>,
    user_metas: Arc<UserMetaStore>,
    user_groups: Arc<UserGroupStore>,
    languages: Arc<LanguageStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(UserStore::new(db.clone())),
            user_metas: Arc::new(UserMetaStore::new(db.clone())),
            user_groups: Arc::new(UserGroupStore::new(db.clone())),
            languages: Arc::new(LanguageStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl AccountStore for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn user_metas(&self) -> Arc<dyn UserMetaRepository> {
        self.user_metas.clone()
    }

    fn user_groups(&self) -> Arc<dyn UserGroupRepository> {
        self.user_groups.clone()
    }

    fn languages(&self) -> Arc<dyn LanguageRepository> {
        self.languages.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TxContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self.db.begin().await.map_err(AppError::from)?;

        let users = TxUserStore::new(&txn);
        let user_metas = TxUserMetaStore::new(&txn);
        let ctx = TxContext {
            users: &users,
            user_metas: &user_metas,
        };

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("transaction rollback failed: {rollback_err}");
                }
                Err(e)
            }
        }
    }
}
