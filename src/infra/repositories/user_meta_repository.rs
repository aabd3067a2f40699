//! User metadata repository: per-user key/value attributes.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, Set,
};

use super::entities::user_meta;
use crate::config::{META_REGISTER_TIME, REGISTER_TIME_FORMAT};
use crate::domain::{NewUserMeta, UserMeta};
use crate::errors::{AppError, AppResult};

#[cfg(feature = "test-utils")]
use mockall::automock;

/// User metadata repository trait for dependency injection.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
pub trait UserMetaRepository: Send + Sync {
    /// All metadata entries of one user
    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<UserMeta>>;

    /// A single entry by (user, key)
    async fn find_by_key(&self, user_id: i64, meta_key: &str) -> AppResult<Option<UserMeta>>;

    /// Insert a new entry; the store assigns the id
    async fn create(&self, meta: NewUserMeta) -> AppResult<UserMeta>;

    /// Overwrite the value of an existing entry
    async fn update(&self, meta: &UserMeta) -> AppResult<()>;

    /// Count users whose RegisterTime meta falls inside [start, end]
    async fn count_registered_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AppResult<u64>;
}

async fn list_for_user<C: ConnectionTrait>(conn: &C, user_id: i64) -> AppResult<Vec<UserMeta>> {
    let models = user_meta::Entity::find()
        .filter(user_meta::Column::UserId.eq(user_id))
        .all(conn)
        .await
        .map_err(AppError::from)?;

    Ok(models.into_iter().map(UserMeta::from).collect())
}

async fn find_by_key<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    meta_key: &str,
) -> AppResult<Option<UserMeta>> {
    let model = user_meta::Entity::find()
        .filter(user_meta::Column::UserId.eq(user_id))
        .filter(user_meta::Column::MetaKey.eq(meta_key))
        .one(conn)
        .await
        .map_err(AppError::from)?;

    Ok(model.map(UserMeta::from))
}

async fn create<C: ConnectionTrait>(conn: &C, meta: NewUserMeta) -> AppResult<UserMeta> {
    let active = user_meta::ActiveModel {
        user_id: Set(meta.user_id),
        meta_key: Set(meta.meta_key),
        meta_value: Set(meta.meta_value),
        ..Default::default()
    };

    let model = active.insert(conn).await.map_err(AppError::from)?;
    Ok(UserMeta::from(model))
}

async fn update<C: ConnectionTrait>(conn: &C, meta: &UserMeta) -> AppResult<()> {
    let active = user_meta::ActiveModel {
        id: Set(meta.id),
        user_id: Set(meta.user_id),
        meta_key: Set(meta.meta_key.clone()),
        meta_value: Set(meta.meta_value.clone()),
    };

    active.update(conn).await.map_err(AppError::from)?;
    Ok(())
}

/// RegisterTime values are stored formatted; the format orders
/// lexicographically the same as chronologically, so a string range
/// comparison implements the time window.
async fn count_registered_between<C: ConnectionTrait>(
    conn: &C,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> AppResult<u64> {
    let start = start.format(REGISTER_TIME_FORMAT).to_string();
    let end = end.format(REGISTER_TIME_FORMAT).to_string();

    user_meta::Entity::find()
        .filter(user_meta::Column::MetaKey.eq(META_REGISTER_TIME))
        .filter(user_meta::Column::MetaValue.gte(start))
        .filter(user_meta::Column::MetaValue.lte(end))
        .count(conn)
        .await
        .map_err(AppError::from)
}

/// SeaORM-backed metadata repository over a pooled connection.
pub struct UserMetaStore {
    db: DatabaseConnection,
}

impl UserMetaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserMetaRepository for UserMetaStore {
    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<UserMeta>> {
        list_for_user(&self.db, user_id).await
    }

    async fn find_by_key(&self, user_id: i64, meta_key: &str) -> AppResult<Option<UserMeta>> {
        find_by_key(&self.db, user_id, meta_key).await
    }

    async fn create(&self, meta: NewUserMeta) -> AppResult<UserMeta> {
        create(&self.db, meta).await
    }

    async fn update(&self, meta: &UserMeta) -> AppResult<()> {
        update(&self.db, meta).await
    }

    async fn count_registered_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AppResult<u64> {
        count_registered_between(&self.db, start, end).await
    }
}

/// Transaction-bound metadata repository.
pub struct TxUserMetaStore<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserMetaStore<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl UserMetaRepository for TxUserMetaStore<'_> {
    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<UserMeta>> {
        list_for_user(self.txn, user_id).await
    }

    async fn find_by_key(&self, user_id: i64, meta_key: &str) -> AppResult<Option<UserMeta>> {
        find_by_key(self.txn, user_id, meta_key).await
    }

    async fn create(&self, meta: NewUserMeta) -> AppResult<UserMeta> {
        create(self.txn, meta).await
    }

    async fn update(&self, meta: &UserMeta) -> AppResult<()> {
        update(self.txn, meta).await
    }

    async fn count_registered_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AppResult<u64> {
        count_registered_between(self.txn, start, end).await
    }
}
