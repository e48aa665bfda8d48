//! Create review table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Review::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Review::OrderId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::ReviewerId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::TargetId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::Rating).small_integer().not_null())
                    .col(ColumnDef::new(Review::Comment).text())
                    .col(
                        ColumnDef::new(Review::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Review::UpdatedAt).timestamp_with_time_zone())
                    .check(Expr::col(Review::Rating).between(1, 5))
                    .to_owned(),
            )
            .await?;

        // Unique index: one review per order
        manager
            .create_index(
                Index::create()
                    .name("idx_review_order_id")
                    .table(Review::Table)
                    .col(Review::OrderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: seller aggregate rating reads
        manager
            .create_index(
                Index::create()
                    .name("idx_review_target_id")
                    .table(Review::Table)
                    .col(Review::TargetId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Review {
    Table,
    Id,
    OrderId,
    ReviewerId,
    TargetId,
    Rating,
    Comment,
    CreatedAt,
    UpdatedAt,
}
