//! Report repository.

use std::sync::Arc;

use crate::entities::{
    Report,
    report::{self, ReportStatus, ReportTarget, ReportType},
};
use bookmarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a report by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<report::Model> {
        Report::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Report {id} not found")))
    }

    /// Find an existing report by the same reporter against the same
    /// target. Used for the one-report-per-(reporter, type, target) rule.
    pub async fn find_duplicate(
        &self,
        reporter_id: &str,
        target: &ReportTarget,
    ) -> AppResult<Option<report::Model>> {
        let mut query = Report::find()
            .filter(report::Column::ReporterId.eq(reporter_id))
            .filter(report::Column::ReportType.eq(target.report_type()));

        query = match target {
            ReportTarget::Posting(id) => query.filter(report::Column::PostingId.eq(id)),
            ReportTarget::Comment(id) => query.filter(report::Column::CommentId.eq(id)),
            ReportTarget::OrderViolation { order_id, .. } => {
                query.filter(report::Column::OrderId.eq(order_id))
            }
        };

        query
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List reports, newest first, with optional status and type filters.
    pub async fn list(
        &self,
        status: Option<ReportStatus>,
        report_type: Option<ReportType>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<report::Model>> {
        let mut query = Report::find().order_by_desc(report::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(report::Column::Status.eq(s));
        }
        if let Some(t) = report_type {
            query = query.filter(report::Column::ReportType.eq(t));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List reports submitted by one user, newest first.
    pub async fn find_by_reporter(
        &self,
        reporter_id: &str,
        status: Option<ReportStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<report::Model>> {
        let mut query = Report::find()
            .filter(report::Column::ReporterId.eq(reporter_id))
            .order_by_desc(report::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(report::Column::Status.eq(s));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a report.
    pub async fn update(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reports pending review.
    pub async fn count_pending(&self) -> AppResult<u64> {
        Report::find()
            .filter(report::Column::Status.eq(ReportStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all reports.
    pub async fn count(&self) -> AppResult<u64> {
        Report::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_report(id: &str, reporter_id: &str, posting_id: &str) -> report::Model {
        report::Model {
            id: id.to_string(),
            reporter_id: reporter_id.to_string(),
            report_type: ReportType::Posting,
            posting_id: Some(posting_id.to_string()),
            comment_id: None,
            order_id: None,
            target_user_id: None,
            reason: "Counterfeit textbook".to_string(),
            status: ReportStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_duplicate_hit() {
        let report = create_test_report("r1", "user1", "p1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo
            .find_duplicate("user1", &ReportTarget::Posting("p1".to_string()))
            .await
            .unwrap();

        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_find_duplicate_miss() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo
            .find_duplicate("user1", &ReportTarget::Comment("c1".to_string()))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_pending() {
        let reports = vec![
            create_test_report("r1", "user1", "p1"),
            create_test_report("r2", "user2", "p2"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([reports])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo
            .list(Some(ReportStatus::Pending), None, 20, 0)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }
}
