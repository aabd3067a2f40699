//! User metadata database entity for SeaORM.
//!
//! One row per (user, key); uniqueness is enforced by a composite index in
//! the schema migration.

use sea_orm::entity::prelude::*;

use crate::domain::UserMeta;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_metas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub meta_key: String,
    pub meta_value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for UserMeta {
    fn from(model: Model) -> Self {
        UserMeta {
            id: model.id,
            user_id: model.user_id,
            meta_key: model.meta_key,
            meta_value: model.meta_value,
        }
    }
}
