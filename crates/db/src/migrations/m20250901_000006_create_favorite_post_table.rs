//! Create favorite post table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FavoritePost::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FavoritePost::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(FavoritePost::PostingId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(FavoritePost::AddedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(FavoritePost::UserId)
                            .col(FavoritePost::PostingId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_favorite_post_posting_id")
                    .table(FavoritePost::Table)
                    .col(FavoritePost::PostingId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FavoritePost::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FavoritePost {
    Table,
    UserId,
    PostingId,
    AddedAt,
}
