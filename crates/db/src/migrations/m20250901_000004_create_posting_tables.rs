//! Create posting and posting image tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posting::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posting::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Posting::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Posting::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Posting::Description).text())
                    .col(ColumnDef::new(Posting::Price).big_integer().not_null())
                    .col(
                        ColumnDef::new(Posting::Status)
                            .string_len(16)
                            .not_null()
                            .default("listed"),
                    )
                    .col(ColumnDef::new(Posting::CategoryId).string_len(32))
                    .col(ColumnDef::new(Posting::CourseId).string_len(32))
                    .col(ColumnDef::new(Posting::ImageUrl).string_len(1024))
                    .col(
                        ColumnDef::new(Posting::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Posting::UpdatedAt).timestamp_with_time_zone())
                    .check(Expr::col(Posting::Price).gt(0))
                    .to_owned(),
            )
            .await?;

        // Index: seller lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_posting_user_id")
                    .table(Posting::Table)
                    .col(Posting::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: status (search default filters on listed)
        manager
            .create_index(
                Index::create()
                    .name("idx_posting_status")
                    .table(Posting::Table)
                    .col(Posting::Status)
                    .to_owned(),
            )
            .await?;

        // Index: catalog filters
        manager
            .create_index(
                Index::create()
                    .name("idx_posting_category_id")
                    .table(Posting::Table)
                    .col(Posting::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posting_course_id")
                    .table(Posting::Table)
                    .col(Posting::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posting_created_at")
                    .table(Posting::Table)
                    .col(Posting::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostingImage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostingImage::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostingImage::PostingId).string_len(32).not_null())
                    .col(ColumnDef::new(PostingImage::ImageUrl).string_len(1024).not_null())
                    .col(
                        ColumnDef::new(PostingImage::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PostingImage::CreatedAt)
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
                    .name("idx_posting_image_posting_id")
                    .table(PostingImage::Table)
                    .col(PostingImage::PostingId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostingImage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posting::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Posting {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Price,
    Status,
    CategoryId,
    CourseId,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PostingImage {
    Table,
    Id,
    PostingId,
    ImageUrl,
    DisplayOrder,
    CreatedAt,
}
