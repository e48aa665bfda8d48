//! Statistics repository for the admin dashboard.

use std::sync::Arc;

use crate::entities::{
    FavoritePost, Order, Posting, Report, TransactionRecord, User, favorite_post, order,
    posting::{self, PostingStatus},
    report::{self, ReportStatus},
    transaction_record::TransType,
};
use bookmarket_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Statement,
};
use serde::Serialize;

/// Platform-wide totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_postings: u64,
    pub active_postings: u64,
    pub sold_postings: u64,
    pub total_orders: u64,
    pub total_transactions: u64,
    /// Gross traded volume: sum of absolute payment and income amounts.
    pub total_revenue: i64,
    pub total_reports: u64,
    pub pending_reports: u64,
}

/// Per-user activity totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_posts: u64,
    pub sold_posts: u64,
    pub orders_as_buyer: u64,
    /// Sum of payment amounts (absolute value).
    pub total_spent: i64,
    /// Sum of income amounts.
    pub total_earned: i64,
    pub favorite_count: u64,
}

/// Count and volume per transaction type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransTypeBreakdown {
    pub trans_type: TransType,
    pub count: i64,
    pub total: i64,
}

/// Statistics repository for database operations.
#[derive(Clone)]
pub struct StatsRepository {
    db: Arc<DatabaseConnection>,
}

impl StatsRepository {
    /// Create a new statistics repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Collect platform-wide totals.
    pub async fn platform(&self) -> AppResult<PlatformStats> {
        let total_users = User::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let total_postings = Posting::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let active_postings = Posting::find()
            .filter(posting::Column::Status.eq(PostingStatus::Listed))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let sold_postings = Posting::find()
            .filter(posting::Column::Status.eq(PostingStatus::Sold))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let total_orders = Order::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let total_transactions = TransactionRecord::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let total_reports = Report::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let pending_reports = Report::find()
            .filter(report::Column::Status.eq(ReportStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let total_revenue = self
            .sum_abs_amount("trans_type IN ('payment', 'income')", &[])
            .await?;

        Ok(PlatformStats {
            total_users,
            total_postings,
            active_postings,
            sold_postings,
            total_orders,
            total_transactions,
            total_revenue,
            total_reports,
            pending_reports,
        })
    }

    /// Collect activity totals for one user.
    pub async fn for_user(&self, user_id: &str) -> AppResult<UserStats> {
        let total_posts = Posting::find()
            .filter(posting::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let sold_posts = Posting::find()
            .filter(posting::Column::UserId.eq(user_id))
            .filter(posting::Column::Status.eq(PostingStatus::Sold))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let orders_as_buyer = Order::find()
            .filter(order::Column::BuyerId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let favorite_count = FavoritePost::find()
            .filter(favorite_post::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let total_spent = self
            .sum_abs_amount("trans_type = 'payment' AND user_id = $1", &[user_id])
            .await?;
        let total_earned = self
            .sum_abs_amount("trans_type = 'income' AND user_id = $1", &[user_id])
            .await?;

        Ok(UserStats {
            total_posts,
            sold_posts,
            orders_as_buyer,
            total_spent,
            total_earned,
            favorite_count,
        })
    }

    /// Count and volume per transaction type over the most recent records.
    pub async fn transaction_breakdown(&self, limit: u64) -> AppResult<Vec<TransTypeBreakdown>> {
        let sql = format!(
            r"
            SELECT trans_type, COUNT(*) AS count, CAST(SUM(ABS(amount)) AS BIGINT) AS total
            FROM (
                SELECT trans_type, amount FROM transaction_record
                ORDER BY created_at DESC
                LIMIT {limit}
            ) AS recent
            GROUP BY trans_type
            ORDER BY trans_type
            "
        );

        let rows = self
            .db
            .query_all(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql,
            ))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut breakdown = Vec::new();
        for row in rows {
            let raw_type: String = row
                .try_get("", "trans_type")
                .map_err(|e| AppError::Database(e.to_string()))?;
            let trans_type = match raw_type.as_str() {
                "top_up" => TransType::TopUp,
                "payment" => TransType::Payment,
                "income" => TransType::Income,
                "refund" => TransType::Refund,
                other => {
                    return Err(AppError::Database(format!(
                        "unknown trans_type in ledger: {other}"
                    )));
                }
            };
            let count: i64 = row
                .try_get("", "count")
                .map_err(|e| AppError::Database(e.to_string()))?;
            let total: i64 = row
                .try_get("", "total")
                .map_err(|e| AppError::Database(e.to_string()))?;

            breakdown.push(TransTypeBreakdown {
                trans_type,
                count,
                total,
            });
        }

        Ok(breakdown)
    }

    async fn sum_abs_amount(&self, where_clause: &str, params: &[&str]) -> AppResult<i64> {
        let sql = format!(
            "SELECT CAST(COALESCE(SUM(ABS(amount)), 0) AS BIGINT) AS total \
             FROM transaction_record WHERE {where_clause}"
        );

        let values: Vec<sea_orm::Value> = params.iter().map(|p| (*p).into()).collect();
        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                &sql,
                values,
            ))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map_or(Ok(0), |r| {
            r.try_get::<i64>("", "total")
                .map_err(|e| AppError::Database(e.to_string()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_stats_serializes_camel_case() {
        let stats = PlatformStats {
            total_users: 10,
            total_postings: 5,
            active_postings: 3,
            sold_postings: 2,
            total_orders: 2,
            total_transactions: 6,
            total_revenue: 1200,
            total_reports: 1,
            pending_reports: 1,
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalUsers"], 10);
        assert_eq!(json["pendingReports"], 1);
    }
}
