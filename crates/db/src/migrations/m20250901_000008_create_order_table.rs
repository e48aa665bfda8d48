//! Create orders table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Orders::BuyerId).string_len(32).not_null())
                    .col(ColumnDef::new(Orders::PostingId).string_len(32).not_null())
                    .col(ColumnDef::new(Orders::DealPrice).big_integer().not_null())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string_len(16)
                            .not_null()
                            .default("completed"),
                    )
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_buyer_id")
                    .table(Orders::Table)
                    .col(Orders::BuyerId)
                    .to_owned(),
            )
            .await?;

        // The posting status CAS is the real at-most-one-sale guard; this
        // index keeps order-per-posting lookups cheap.
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_posting_id")
                    .table(Orders::Table)
                    .col(Orders::PostingId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    BuyerId,
    PostingId,
    DealPrice,
    Status,
    CreatedAt,
}
