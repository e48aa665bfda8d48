//! Order entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order status.
///
/// Orders are created `Completed`; the only later transition is an
/// admin-driven cancellation that refunds through the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum OrderStatus {
    #[sea_orm(string_value = "completed")]
    #[default]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Record of one completed purchase.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub buyer_id: String,

    pub posting_id: String,

    /// Price snapshot at the moment of purchase. Later listing price
    /// edits never retroactively apply.
    pub deal_price: i64,

    pub status: OrderStatus,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::BuyerId",
        to = "super::user::Column::Id"
    )]
    Buyer,

    #[sea_orm(
        belongs_to = "super::posting::Entity",
        from = "Column::PostingId",
        to = "super::posting::Column::Id"
    )]
    Posting,
}

impl Related<super::posting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posting.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
