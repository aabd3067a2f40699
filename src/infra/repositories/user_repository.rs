//! User repository: lookups and writes for user rows.
//!
//! Query logic is shared between the pooled-connection store and the
//! transaction-bound store through helpers generic over `ConnectionTrait`.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::entities::{language, user, user_group};
use crate::domain::{NewUser, User};
use crate::errors::{AppError, AppResult};

#[cfg(feature = "test-utils")]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// All lookups return `Ok(None)` for missing rows; uniqueness violations on
/// writes surface as [`AppError::Conflict`].
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by unique id
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Find user by unique username
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Find user by unique email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// List users in a group with id >= `offset_id`, ordered by id,
    /// at most `limit` rows
    async fn list_by_group(&self, group_id: i64, offset_id: i64, limit: u64)
        -> AppResult<Vec<User>>;

    /// Insert a new user row; the store assigns the id
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Overwrite all mutable fields of an existing user row
    async fn update(&self, user: &User) -> AppResult<()>;

    /// Delete a user row by id
    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Count users belonging to a group
    async fn count_by_group(&self, group_id: i64) -> AppResult<u64>;
}

/// Attach the group and language references to a bare user row.
async fn hydrate<C: ConnectionTrait>(conn: &C, model: user::Model) -> AppResult<User> {
    let group = user_group::Entity::find_by_id(model.user_group_id)
        .one(conn)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| {
            AppError::internal(format!(
                "user group {} referenced by user {} is missing",
                model.user_group_id, model.id
            ))
        })?;
    let lang = language::Entity::find_by_id(model.prefer_language_id)
        .one(conn)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| {
            AppError::internal(format!(
                "language {} referenced by user {} is missing",
                model.prefer_language_id, model.id
            ))
        })?;

    Ok(User {
        id: model.id,
        username: model.username,
        password: model.password,
        email: model.email,
        user_group: group.into(),
        prefer_language: lang.into(),
    })
}

async fn fetch_optional<C: ConnectionTrait>(
    conn: &C,
    model: Option<user::Model>,
) -> AppResult<Option<User>> {
    match model {
        Some(model) => Ok(Some(hydrate(conn, model).await?)),
        None => Ok(None),
    }
}

async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i64) -> AppResult<Option<User>> {
    let model = user::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(AppError::from)?;
    fetch_optional(conn, model).await
}

async fn find_by_username<C: ConnectionTrait>(conn: &C, username: &str) -> AppResult<Option<User>> {
    let model = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(conn)
        .await
        .map_err(AppError::from)?;
    fetch_optional(conn, model).await
}

async fn find_by_email<C: ConnectionTrait>(conn: &C, email: &str) -> AppResult<Option<User>> {
    let model = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(conn)
        .await
        .map_err(AppError::from)?;
    fetch_optional(conn, model).await
}

async fn list_by_group<C: ConnectionTrait>(
    conn: &C,
    group_id: i64,
    offset_id: i64,
    limit: u64,
) -> AppResult<Vec<User>> {
    let models = user::Entity::find()
        .filter(user::Column::UserGroupId.eq(group_id))
        .filter(user::Column::Id.gte(offset_id))
        .order_by_asc(user::Column::Id)
        .limit(limit)
        .all(conn)
        .await
        .map_err(AppError::from)?;

    let mut users = Vec::with_capacity(models.len());
    for model in models {
        users.push(hydrate(conn, model).await?);
    }
    Ok(users)
}

async fn create<C: ConnectionTrait>(conn: &C, new_user: NewUser) -> AppResult<User> {
    let active = user::ActiveModel {
        username: Set(new_user.username),
        password: Set(new_user.password),
        email: Set(new_user.email),
        user_group_id: Set(new_user.user_group_id),
        prefer_language_id: Set(new_user.prefer_language_id),
        ..Default::default()
    };

    let model = active.insert(conn).await.map_err(AppError::from)?;
    hydrate(conn, model).await
}

async fn update<C: ConnectionTrait>(conn: &C, user: &User) -> AppResult<()> {
    let active = user::ActiveModel {
        id: Set(user.id),
        username: Set(user.username.clone()),
        password: Set(user.password.clone()),
        email: Set(user.email.clone()),
        user_group_id: Set(user.user_group.id),
        prefer_language_id: Set(user.prefer_language.id),
    };

    active.update(conn).await.map_err(AppError::from)?;
    Ok(())
}

async fn delete<C: ConnectionTrait>(conn: &C, id: i64) -> AppResult<()> {
    let result = user::Entity::delete_by_id(id)
        .exec(conn)
        .await
        .map_err(AppError::from)?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

async fn count_by_group<C: ConnectionTrait>(conn: &C, group_id: i64) -> AppResult<u64> {
    user::Entity::find()
        .filter(user::Column::UserGroupId.eq(group_id))
        .count(conn)
        .await
        .map_err(AppError::from)
}

/// SeaORM-backed user repository over a pooled connection.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        find_by_id(&self.db, id).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        find_by_username(&self.db, username).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        find_by_email(&self.db, email).await
    }

    async fn list_by_group(
        &self,
        group_id: i64,
        offset_id: i64,
        limit: u64,
    ) -> AppResult<Vec<User>> {
        list_by_group(&self.db, group_id, offset_id, limit).await
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        create(&self.db, user).await
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        update(&self.db, user).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        delete(&self.db, id).await
    }

    async fn count_by_group(&self, group_id: i64) -> AppResult<u64> {
        count_by_group(&self.db, group_id).await
    }
}

/// Transaction-bound user repository.
///
/// All operations run on the borrowed transaction and become visible only
/// when the enclosing unit of work commits.
pub struct TxUserStore<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserStore<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl UserRepository for TxUserStore<'_> {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        find_by_id(self.txn, id).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        find_by_username(self.txn, username).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        find_by_email(self.txn, email).await
    }

    async fn list_by_group(
        &self,
        group_id: i64,
        offset_id: i64,
        limit: u64,
    ) -> AppResult<Vec<User>> {
        list_by_group(self.txn, group_id, offset_id, limit).await
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        create(self.txn, user).await
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        update(self.txn, user).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        delete(self.txn, id).await
    }

    async fn count_by_group(&self, group_id: i64) -> AppResult<u64> {
        count_by_group(self.txn, group_id).await
    }
}
