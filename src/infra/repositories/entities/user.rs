//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    /// MD5 hex digest, never plaintext
    pub password: String,
    #[sea_orm(unique)]
    pub email: String,
    pub user_group_id: i64,
    pub prefer_language_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_group::Entity",
        from = "Column::UserGroupId",
        to = "super::user_group::Column::Id"
    )]
    UserGroup,
    #[sea_orm(
        belongs_to = "super::language::Entity",
        from = "Column::PreferLanguageId",
        to = "super::language::Column::Id"
    )]
    Language,
    #[sea_orm(has_many = "super::user_meta::Entity")]
    UserMeta,
}

impl Related<super::user_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserGroup.def()
    }
}

impl Related<super::language::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Language.def()
    }
}

impl Related<super::user_meta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserMeta.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
