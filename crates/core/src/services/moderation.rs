//! Moderation service for abuse reports.

use bookmarket_common::{AppError, AppResult, IdGenerator};
use bookmarket_db::{
    entities::{
        posting::{self, PostingStatus},
        report::{self, ReportStatus, ReportTarget},
        user,
    },
    repositories::{
        CommentRepository, OrderRepository, PostingRepository, ReportRepository, UserRepository,
    },
};
use sea_orm::Set;

pub use bookmarket_db::entities::report::ReportType;

const MAX_REASON_LEN: usize = 2000;

/// Input for submitting a report.
pub struct SubmitReportInput {
    pub target: ReportTarget,
    pub reason: String,
}

/// Input for reviewing a report.
pub struct ReviewReportInput {
    pub report_id: String,
    pub decision: ReportStatus,
    /// When approving a posting report, also take the listing down.
    pub remove_posting: bool,
}

/// Moderation service for the report workflow.
#[derive(Clone)]
pub struct ModerationService {
    report_repo: ReportRepository,
    posting_repo: PostingRepository,
    comment_repo: CommentRepository,
    order_repo: OrderRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        posting_repo: PostingRepository,
        comment_repo: CommentRepository,
        order_repo: OrderRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            report_repo,
            posting_repo,
            comment_repo,
            order_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a new report.
    pub async fn submit(
        &self,
        reporter_id: &str,
        input: SubmitReportInput,
    ) -> AppResult<report::Model> {
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation("Report reason is required".to_string()));
        }
        if reason.len() > MAX_REASON_LEN {
            return Err(AppError::Validation("Report reason too long".to_string()));
        }

        // One report per (reporter, type, target).
        if self
            .report_repo
            .find_duplicate(reporter_id, &input.target)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "You have already reported this target".to_string(),
            ));
        }

        let (posting_id, comment_id, order_id, target_user_id) = match &input.target {
            ReportTarget::Posting(id) => {
                let posting = self.posting_repo.get_by_id(id).await?;
                if posting.user_id == reporter_id {
                    return Err(AppError::Validation(
                        "You cannot report your own listing".to_string(),
                    ));
                }
                (Some(id.clone()), None, None, None)
            }
            ReportTarget::Comment(id) => {
                let comment = self.comment_repo.get_by_id(id).await?;
                if comment.user_id == reporter_id {
                    return Err(AppError::Validation(
                        "You cannot report your own comment".to_string(),
                    ));
                }
                // Keep the comment's posting for moderation context.
                (Some(comment.posting_id), Some(id.clone()), None, None)
            }
            ReportTarget::OrderViolation {
                order_id,
                target_user_id,
            } => {
                if target_user_id == reporter_id {
                    return Err(AppError::Validation(
                        "You cannot report yourself".to_string(),
                    ));
                }

                let order = self.order_repo.get_by_id(order_id).await?;
                let posting = self.posting_repo.get_by_id(&order.posting_id).await?;
                let seller_id = posting.user_id;

                // Only the two parties to the order may report each other.
                if reporter_id != order.buyer_id && reporter_id != seller_id {
                    return Err(AppError::Forbidden(
                        "Only the buyer or seller can report this order".to_string(),
                    ));
                }
                if *target_user_id != order.buyer_id && *target_user_id != seller_id {
                    return Err(AppError::Validation(
                        "Target user must be the order's buyer or seller".to_string(),
                    ));
                }

                (None, None, Some(order_id.clone()), Some(target_user_id.clone()))
            }
        };

        let model = report::ActiveModel {
            id: Set(self.id_gen.generate()),
            reporter_id: Set(reporter_id.to_string()),
            report_type: Set(input.target.report_type()),
            posting_id: Set(posting_id),
            comment_id: Set(comment_id),
            order_id: Set(order_id),
            target_user_id: Set(target_user_id),
            reason: Set(reason.to_string()),
            status: Set(ReportStatus::Pending),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.report_repo.create(model).await
    }

    /// Review a pending report. Admin-only.
    ///
    /// The decision is written exactly once: re-reviewing an already
    /// reviewed report fails with `Conflict` and never overwrites the
    /// first decision. Approval cascades (listing removal, violation
    /// counter) are best-effort: a cascade failure is logged and does not
    /// roll the committed decision back.
    pub async fn review(
        &self,
        reviewer_id: &str,
        input: ReviewReportInput,
    ) -> AppResult<report::Model> {
        let reviewer = self.user_repo.get_by_id(reviewer_id).await?;
        if !reviewer.is_admin {
            return Err(AppError::Forbidden(
                "Only administrators can review reports".to_string(),
            ));
        }

        if input.decision == ReportStatus::Pending {
            return Err(AppError::Validation(
                "Decision must be approved or rejected".to_string(),
            ));
        }

        let report = self.report_repo.get_by_id(&input.report_id).await?;

        if report.status != ReportStatus::Pending {
            return Err(AppError::Conflict(
                "Report has already been reviewed".to_string(),
            ));
        }

        let target = report.target().map_err(|e| AppError::Database(e.to_string()))?;

        let mut model: report::ActiveModel = report.into();
        model.status = Set(input.decision);
        model.reviewed_by = Set(Some(reviewer_id.to_string()));
        model.reviewed_at = Set(Some(chrono::Utc::now().into()));

        let reviewed = self.report_repo.update(model).await?;

        if input.decision == ReportStatus::Approved {
            self.apply_cascades(&reviewed, &target, input.remove_posting)
                .await;
        }

        Ok(reviewed)
    }

    /// Best-effort side effects of an approved report. Failures are
    /// logged, never surfaced: the review decision stands either way.
    async fn apply_cascades(
        &self,
        report: &report::Model,
        target: &ReportTarget,
        remove_posting: bool,
    ) {
        match target {
            ReportTarget::Posting(posting_id) if remove_posting => {
                if let Err(e) = self.remove_posting(posting_id).await {
                    tracing::warn!(
                        report_id = %report.id,
                        posting_id = %posting_id,
                        error = %e,
                        "Failed to remove listing after report approval"
                    );
                }
            }
            ReportTarget::OrderViolation { target_user_id, .. } => {
                if let Err(e) = self.bump_violation_count(target_user_id).await {
                    tracing::warn!(
                        report_id = %report.id,
                        target_user_id = %target_user_id,
                        error = %e,
                        "Failed to increment violation count after report approval"
                    );
                }
            }
            _ => {}
        }
    }

    async fn remove_posting(&self, posting_id: &str) -> AppResult<()> {
        let posting = self.posting_repo.get_by_id(posting_id).await?;
        if posting.status == PostingStatus::Removed {
            return Ok(());
        }

        let mut active: posting::ActiveModel = posting.into();
        active.status = Set(PostingStatus::Removed);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.posting_repo.update(active).await?;
        Ok(())
    }

    async fn bump_violation_count(&self, user_id: &str) -> AppResult<()> {
        let target = self.user_repo.get_by_id(user_id).await?;
        let count = target.violation_count + 1;

        let mut active: user::ActiveModel = target.into();
        active.violation_count = Set(count);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(active).await?;
        Ok(())
    }

    /// Get a report by ID.
    pub async fn get_report(&self, id: &str) -> AppResult<report::Model> {
        self.report_repo.get_by_id(id).await
    }

    /// List reports with optional status and type filters.
    pub async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        report_type: Option<ReportType>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<report::Model>> {
        self.report_repo.list(status, report_type, limit, offset).await
    }

    /// List reports submitted by one user.
    pub async fn list_by_reporter(
        &self,
        reporter_id: &str,
        status: Option<ReportStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<report::Model>> {
        self.report_repo
            .find_by_reporter(reporter_id, status, limit, offset)
            .await
    }

    /// Count reports pending review.
    pub async fn count_pending(&self) -> AppResult<u64> {
        self.report_repo.count_pending().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn build_service(db: Arc<DatabaseConnection>) -> ModerationService {
        ModerationService::new(
            ReportRepository::new(Arc::clone(&db)),
            PostingRepository::new(Arc::clone(&db)),
            CommentRepository::new(Arc::clone(&db)),
            OrderRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    fn create_test_user(id: &str, is_admin: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{id}@campus.example"),
            username: id.to_string(),
            password_hash: "$argon2id$test".to_string(),
            token: None,
            balance: 0,
            is_admin,
            is_blocked: false,
            violation_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_report(id: &str, status: ReportStatus) -> report::Model {
        report::Model {
            id: id.to_string(),
            reporter_id: "user1".to_string(),
            report_type: ReportType::Posting,
            posting_id: Some("p1".to_string()),
            comment_id: None,
            order_id: None,
            target_user_id: None,
            reason: "spam".to_string(),
            status,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_reason() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = build_service(db);

        let result = service
            .submit(
                "user1",
                SubmitReportInput {
                    target: ReportTarget::Posting("p1".to_string()),
                    reason: "   ".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_submit_duplicate_conflicts() {
        let existing = create_test_report("r1", ReportStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service
            .submit(
                "user1",
                SubmitReportInput {
                    target: ReportTarget::Posting("p1".to_string()),
                    reason: "spam".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_submit_self_violation_rejected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // duplicate check comes back empty
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service
            .submit(
                "user1",
                SubmitReportInput {
                    target: ReportTarget::OrderViolation {
                        order_id: "o1".to_string(),
                        target_user_id: "user1".to_string(),
                    },
                    reason: "never shipped".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_review_requires_admin() {
        let reviewer = create_test_user("mod1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reviewer]])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service
            .review(
                "mod1",
                ReviewReportInput {
                    report_id: "r1".to_string(),
                    decision: ReportStatus::Approved,
                    remove_posting: false,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_review_already_reviewed_conflicts() {
        let admin = create_test_user("admin1", true);
        let mut reviewed = create_test_report("r1", ReportStatus::Approved);
        reviewed.reviewed_by = Some("admin0".to_string());
        reviewed.reviewed_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin]])
                .append_query_results([[reviewed]])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service
            .review(
                "admin1",
                ReviewReportInput {
                    report_id: "r1".to_string(),
                    decision: ReportStatus::Rejected,
                    remove_posting: false,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_review_rejects_pending_decision() {
        let admin = create_test_user("admin1", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin]])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service
            .review(
                "admin1",
                ReviewReportInput {
                    report_id: "r1".to_string(),
                    decision: ReportStatus::Pending,
                    remove_posting: false,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
