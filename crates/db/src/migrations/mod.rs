//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250901_000001_create_user_table;
mod m20250901_000002_create_category_table;
mod m20250901_000003_create_course_table;
mod m20250901_000004_create_posting_tables;
mod m20250901_000005_create_comment_table;
mod m20250901_000006_create_favorite_post_table;
mod m20250901_000007_create_message_table;
mod m20250901_000008_create_order_table;
mod m20250901_000009_create_transaction_record_table;
mod m20250901_000010_create_review_table;
mod m20250901_000011_create_report_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_user_table::Migration),
            Box::new(m20250901_000002_create_category_table::Migration),
            Box::new(m20250901_000003_create_course_table::Migration),
            Box::new(m20250901_000004_create_posting_tables::Migration),
            Box::new(m20250901_000005_create_comment_table::Migration),
            Box::new(m20250901_000006_create_favorite_post_table::Migration),
            Box::new(m20250901_000007_create_message_table::Migration),
            Box::new(m20250901_000008_create_order_table::Migration),
            Box::new(m20250901_000009_create_transaction_record_table::Migration),
            Box::new(m20250901_000010_create_review_table::Migration),
            Box::new(m20250901_000011_create_report_table::Migration),
        ]
    }
}
