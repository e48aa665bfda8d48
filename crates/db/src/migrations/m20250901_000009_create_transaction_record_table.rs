//! Create transaction record table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TransactionRecord::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionRecord::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TransactionRecord::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(TransactionRecord::Amount).big_integer().not_null())
                    .col(ColumnDef::new(TransactionRecord::TransType).string_len(16).not_null())
                    .col(
                        ColumnDef::new(TransactionRecord::CreatedAt)
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
                    .name("idx_transaction_record_user_id")
                    .table(TransactionRecord::Table)
                    .col(TransactionRecord::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_record_created_at")
                    .table(TransactionRecord::Table)
                    .col(TransactionRecord::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransactionRecord::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TransactionRecord {
    Table,
    Id,
    UserId,
    Amount,
    TransType,
    CreatedAt,
}
