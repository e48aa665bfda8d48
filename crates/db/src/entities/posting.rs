//! Posting (listing) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Posting lifecycle status.
///
/// The only path into `Sold` is the purchase compare-and-swap. `Removed`
/// is fully terminal; a sold listing can still be removed by moderation
/// but never returns to a sellable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum PostingStatus {
    #[sea_orm(string_value = "listed")]
    #[default]
    Listed,
    #[sea_orm(string_value = "reserved")]
    Reserved,
    #[sea_orm(string_value = "sold")]
    Sold,
    #[sea_orm(string_value = "reported")]
    Reported,
    #[sea_orm(string_value = "removed")]
    Removed,
}

impl PostingStatus {
    /// Whether the sales lifecycle has ended (the listing can no longer
    /// be edited or sold).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Sold | Self::Removed)
    }
}

/// Posting model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posting")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The seller.
    pub user_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Asking price in the minor currency unit.
    pub price: i64,

    pub status: PostingStatus,

    #[sea_orm(nullable)]
    pub category_id: Option<String>,

    #[sea_orm(nullable)]
    pub course_id: Option<String>,

    /// Primary image URL (gallery lives in `posting_image`).
    #[sea_orm(nullable)]
    pub image_url: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(has_many = "super::posting_image::Entity")]
    Images,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::posting_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
