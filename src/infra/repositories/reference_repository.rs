//! Reference data lookups: user groups and language preferences.
//!
//! Read-only from this crate's point of view. An unrecognized slug is
//! `Ok(None)`, never an error; the account service turns it into a failed
//! legality check.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::entities::{language, user_group};
use crate::domain::{Language, UserGroup};
use crate::errors::{AppError, AppResult};

#[cfg(feature = "test-utils")]
use mockall::automock;

/// User group repository trait for dependency injection.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
pub trait UserGroupRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<UserGroup>>;
}

/// Language repository trait for dependency injection.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
pub trait LanguageRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Language>>;
}

/// SeaORM-backed user group repository.
pub struct UserGroupStore {
    db: DatabaseConnection,
}

impl UserGroupStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserGroupRepository for UserGroupStore {
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<UserGroup>> {
        let model = user_group::Entity::find()
            .filter(user_group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(model.map(UserGroup::from))
    }
}

/// SeaORM-backed language repository.
pub struct LanguageStore {
    db: DatabaseConnection,
}

impl LanguageStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LanguageRepository for LanguageStore {
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Language>> {
        let model = language::Entity::find()
            .filter(language::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(model.map(Language::from))
    }
}
