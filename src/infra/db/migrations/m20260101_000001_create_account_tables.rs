//! Migration: Create account tables.
//!
//! The unique indexes on username, email, group/language slugs and
//! (user_id, meta_key) are the authoritative uniqueness guard; the service
//! layer's existence checks are a fast-path pre-check only.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserGroups::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserGroups::Slug)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UserGroups::Name).string_len(64).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Languages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Languages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Languages::Slug)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Languages::Name).string_len(64).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(16)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::UserGroupId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Users::PreferLanguageId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_user_group_id")
                            .from(Users::Table, Users::UserGroupId)
                            .to(UserGroups::Table, UserGroups::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_prefer_language_id")
                            .from(Users::Table, Users::PreferLanguageId)
                            .to(Languages::Table, Languages::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserMetas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserMetas::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserMetas::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserMetas::MetaKey).string_len(64).not_null())
                    .col(ColumnDef::new(UserMetas::MetaValue).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_metas_user_id")
                            .from(UserMetas::Table, UserMetas::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_metas_user_id_meta_key")
                    .table(UserMetas::Table)
                    .col(UserMetas::UserId)
                    .col(UserMetas::MetaKey)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserMetas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Languages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserGroups::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    Password,
    Email,
    UserGroupId,
    PreferLanguageId,
}

#[derive(Iden)]
enum UserMetas {
    Table,
    Id,
    UserId,
    MetaKey,
    MetaValue,
}

#[derive(Iden)]
enum UserGroups {
    Table,
    Id,
    Slug,
    Name,
}

#[derive(Iden)]
enum Languages {
    Table,
    Id,
    Slug,
    Name,
}
