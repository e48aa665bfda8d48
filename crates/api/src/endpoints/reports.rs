//! Report endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::post,
};
use bookmarket_common::{AppError, AppResult};
use bookmarket_core::SubmitReportInput;
use bookmarket_db::entities::report::{self, ReportStatus, ReportTarget, ReportType};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::page_offset, extractors::AuthUser, middleware::AppState, response::ApiResponse,
};

/// Report record.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    pub reporter_id: String,
    pub report_type: ReportType,
    pub posting_id: Option<String>,
    pub comment_id: Option<String>,
    pub order_id: Option<String>,
    pub target_user_id: Option<String>,
    pub reason: String,
    pub status: ReportStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<String>,
    pub created_at: String,
}

impl From<report::Model> for ReportResponse {
    fn from(report: report::Model) -> Self {
        Self {
            id: report.id,
            reporter_id: report.reporter_id,
            report_type: report.report_type,
            posting_id: report.posting_id,
            comment_id: report.comment_id,
            order_id: report.order_id,
            target_user_id: report.target_user_id,
            reason: report.reason,
            status: report.status,
            reviewed_by: report.reviewed_by,
            reviewed_at: report.reviewed_at.map(|t| t.to_rfc3339()),
            created_at: report.created_at.to_rfc3339(),
        }
    }
}

/// Report submission request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    pub report_type: ReportType,
    pub target_id: String,
    pub reason: String,
    /// Required for order violations: the accused counterparty.
    pub target_user_id: Option<String>,
}

impl SubmitReportRequest {
    fn into_target(self) -> AppResult<(ReportTarget, String)> {
        let target = match self.report_type {
            ReportType::Posting => ReportTarget::Posting(self.target_id),
            ReportType::Comment => ReportTarget::Comment(self.target_id),
            ReportType::OrderViolation => {
                let target_user_id = self.target_user_id.ok_or_else(|| {
                    AppError::Validation(
                        "targetUserId is required for order violation reports".to_string(),
                    )
                })?;
                ReportTarget::OrderViolation {
                    order_id: self.target_id,
                    target_user_id,
                }
            }
        };
        Ok((target, self.reason))
    }
}

/// Report list query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsQuery {
    pub status: Option<ReportStatus>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Submit a report.
async fn submit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SubmitReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let (target, reason) = req.into_target()?;

    let report = state
        .moderation_service
        .submit(&user.id, SubmitReportInput { target, reason })
        .await?;

    Ok(ApiResponse::ok(report.into()))
}

/// List the caller's own reports.
async fn list_own(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    let per_page = state.page_size(query.per_page);
    let (_, offset) = page_offset(query.page, per_page);

    let reports = state
        .moderation_service
        .list_by_reporter(&user.id, query.status, per_page, offset)
        .await?;

    Ok(ApiResponse::ok(
        reports.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit).get(list_own))
}
