//! Report entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report status. `Pending` reports move to exactly one of the two
/// terminal states and are never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ReportStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// What a report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    #[sea_orm(string_value = "posting")]
    Posting,
    #[sea_orm(string_value = "comment")]
    Comment,
    #[sea_orm(string_value = "order_violation")]
    OrderViolation,
}

/// The target of a report as a tagged union.
///
/// Storage keeps one nullable column per variant; the domain API only
/// accepts and produces this type, so a violation report without a
/// target user cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportTarget {
    /// An offending posting.
    Posting(String),
    /// An offending comment.
    Comment(String),
    /// A dispute over an order, against the named counterparty.
    OrderViolation {
        order_id: String,
        target_user_id: String,
    },
}

impl ReportTarget {
    /// The stored discriminant for this target.
    #[must_use]
    pub const fn report_type(&self) -> ReportType {
        match self {
            Self::Posting(_) => ReportType::Posting,
            Self::Comment(_) => ReportType::Comment,
            Self::OrderViolation { .. } => ReportType::OrderViolation,
        }
    }

    /// The primary target ID (posting, comment, or order).
    #[must_use]
    pub fn target_id(&self) -> &str {
        match self {
            Self::Posting(id) | Self::Comment(id) => id,
            Self::OrderViolation { order_id, .. } => order_id,
        }
    }
}

/// Report model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who submitted the report.
    pub reporter_id: String,

    pub report_type: ReportType,

    /// Set when `report_type` is `posting` or `comment` (the comment's
    /// posting is also recorded for context).
    #[sea_orm(nullable)]
    pub posting_id: Option<String>,

    #[sea_orm(nullable)]
    pub comment_id: Option<String>,

    #[sea_orm(nullable)]
    pub order_id: Option<String>,

    /// The accused counterparty, for order violations.
    #[sea_orm(nullable)]
    pub target_user_id: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub reason: String,

    pub status: ReportStatus,

    /// Admin who reviewed the report. Written exactly once.
    #[sea_orm(nullable)]
    pub reviewed_by: Option<String>,

    #[sea_orm(nullable)]
    pub reviewed_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Reconstruct the tagged target from the stored row.
    ///
    /// Rows are only ever written from a [`ReportTarget`], so a shape
    /// mismatch means the row was corrupted outside the application.
    pub fn target(&self) -> Result<ReportTarget, DbErr> {
        match self.report_type {
            ReportType::Posting => self
                .posting_id
                .clone()
                .map(ReportTarget::Posting)
                .ok_or_else(|| DbErr::Custom("posting report without posting_id".to_string())),
            ReportType::Comment => self
                .comment_id
                .clone()
                .map(ReportTarget::Comment)
                .ok_or_else(|| DbErr::Custom("comment report without comment_id".to_string())),
            ReportType::OrderViolation => match (&self.order_id, &self.target_user_id) {
                (Some(order_id), Some(target_user_id)) => Ok(ReportTarget::OrderViolation {
                    order_id: order_id.clone(),
                    target_user_id: target_user_id.clone(),
                }),
                _ => Err(DbErr::Custom(
                    "order violation report without order_id/target_user_id".to_string(),
                )),
            },
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReporterId",
        to = "super::user::Column::Id"
    )]
    Reporter,
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn base_row() -> Model {
        Model {
            id: "r1".to_string(),
            reporter_id: "u1".to_string(),
            report_type: ReportType::Posting,
            posting_id: Some("p1".to_string()),
            comment_id: None,
            order_id: None,
            target_user_id: None,
            reason: "spam".to_string(),
            status: ReportStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_target_round_trip() {
        let row = base_row();
        assert_eq!(row.target().unwrap(), ReportTarget::Posting("p1".to_string()));
    }

    #[test]
    fn test_violation_target_requires_both_ids() {
        let mut row = base_row();
        row.report_type = ReportType::OrderViolation;
        row.posting_id = None;
        row.order_id = Some("o1".to_string());
        row.target_user_id = None;

        assert!(row.target().is_err());

        row.target_user_id = Some("u2".to_string());
        assert_eq!(
            row.target().unwrap(),
            ReportTarget::OrderViolation {
                order_id: "o1".to_string(),
                target_user_id: "u2".to_string(),
            }
        );
    }

    #[test]
    fn test_target_type_and_id() {
        let target = ReportTarget::OrderViolation {
            order_id: "o9".to_string(),
            target_user_id: "u3".to_string(),
        };
        assert_eq!(target.report_type(), ReportType::OrderViolation);
        assert_eq!(target.target_id(), "o9");
    }
}
