//! Administration endpoints.
//!
//! Every route requires the `AdminUser` extractor; unauthenticated calls
//! get 401 and non-admin accounts get 403 before any handler runs.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use bookmarket_common::{AppError, AppResult};
use bookmarket_core::{
    CreateCategoryInput, CreateCourseInput, ReviewReportInput, UpdateCategoryInput,
    UpdateCourseInput, UserStatistics,
};
use bookmarket_db::{
    entities::{
        posting::PostingStatus,
        report::{ReportStatus, ReportType},
        user,
    },
    repositories::{PlatformStats, PostingSearchFilter, TransTypeBreakdown},
};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::page_offset,
    endpoints::postings::PostingResponse,
    endpoints::reports::ReportResponse,
    endpoints::orders::OrderResponse,
    endpoints::catalog::{CategoryResponse, CourseResponse},
    extractors::AdminUser,
    middleware::AppState,
    response::{ApiResponse, Paginated},
};

/// Administrative view of a user.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub balance: i64,
    pub is_admin: bool,
    pub is_blocked: bool,
    pub violation_count: i32,
    pub created_at: String,
}

impl From<user::Model> for AdminUserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            balance: user.balance,
            is_admin: user.is_admin,
            is_blocked: user.is_blocked,
            violation_count: user.violation_count,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// User detail with activity statistics and recent postings.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserDetailResponse {
    pub user: AdminUserResponse,
    pub statistics: UserStatistics,
    pub postings: Vec<PostingResponse>,
}

/// User list query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub is_admin: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// User update request (block/unblock, role changes).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub is_blocked: Option<bool>,
    pub is_admin: Option<bool>,
}

/// Posting list query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostingsQuery {
    pub status: Option<PostingStatus>,
    pub user_id: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Report list query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsQuery {
    pub status: Option<ReportStatus>,
    pub report_type: Option<ReportType>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Report review request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReportRequest {
    pub status: ReportStatus,
    #[serde(default)]
    pub remove_posting: bool,
}

/// Statistics query.
#[derive(Debug, Deserialize)]
pub struct StatisticsQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Statistics payload, by requested kind.
#[derive(Serialize)]
#[serde(untagged)]
pub enum StatisticsResponse {
    Platform(PlatformStats),
    Transactions { breakdown: Vec<TransTypeBreakdown> },
}

// ========== Users ==========

/// List users.
async fn list_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<ApiResponse<Paginated<AdminUserResponse>>> {
    let per_page = state.page_size(query.per_page);
    let (page, offset) = page_offset(query.page, per_page);

    let (users, total) = state
        .user_service
        .list_users(query.is_admin, per_page, offset)
        .await?;

    Ok(ApiResponse::ok(Paginated {
        items: users.into_iter().map(Into::into).collect(),
        total,
        page,
        per_page,
    }))
}

/// User detail with statistics and recent postings.
async fn get_user(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AdminUserDetailResponse>> {
    let user = state.user_service.get(&id).await?;
    let statistics = state.stats_service.for_user(&id).await?;
    let (postings, _) = state
        .posting_service
        .list_by_user(&id, None, 10, 0)
        .await?;

    Ok(ApiResponse::ok(AdminUserDetailResponse {
        user: user.into(),
        statistics,
        postings: postings.into_iter().map(Into::into).collect(),
    }))
}

/// Block/unblock a user or change their role.
async fn update_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<ApiResponse<AdminUserResponse>> {
    if admin.id == id {
        return Err(AppError::Validation(
            "You cannot change your own account here".to_string(),
        ));
    }

    let mut user = state.user_service.get(&id).await?;

    if let Some(blocked) = req.is_blocked {
        user = state.user_service.set_blocked(&id, blocked).await?;
    }
    if let Some(is_admin) = req.is_admin {
        user = state.user_service.set_admin(&id, is_admin).await?;
    }

    Ok(ApiResponse::ok(user.into()))
}

// ========== Postings ==========

/// List postings across all sellers.
async fn list_postings(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListPostingsQuery>,
) -> AppResult<ApiResponse<Paginated<PostingResponse>>> {
    let per_page = state.page_size(query.per_page);
    let (page, offset) = page_offset(query.page, per_page);

    let filter = PostingSearchFilter {
        status: query.status,
        user_id: query.user_id,
        ..Default::default()
    };
    let (postings, total) = state.posting_service.search(filter, per_page, offset).await?;

    Ok(ApiResponse::ok(Paginated {
        items: postings.into_iter().map(Into::into).collect(),
        total,
        page,
        per_page,
    }))
}

/// Take a listing down on behalf of moderation.
async fn remove_posting(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostingResponse>> {
    let posting = state.posting_service.remove(&id, &admin.id, true).await?;
    Ok(ApiResponse::ok(posting.into()))
}

// ========== Reports ==========

/// List reports.
async fn list_reports(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    let per_page = state.page_size(query.per_page);
    let (_, offset) = page_offset(query.page, per_page);

    let reports = state
        .moderation_service
        .list_reports(query.status, query.report_type, per_page, offset)
        .await?;

    Ok(ApiResponse::ok(
        reports.into_iter().map(Into::into).collect(),
    ))
}

/// Report detail.
async fn get_report(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state.moderation_service.get_report(&id).await?;
    Ok(ApiResponse::ok(report.into()))
}

/// Review a pending report.
async fn review_report(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReviewReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state
        .moderation_service
        .review(
            &admin.id,
            ReviewReportInput {
                report_id: id,
                decision: req.status,
                remove_posting: req.remove_posting,
            },
        )
        .await?;

    Ok(ApiResponse::ok(report.into()))
}

// ========== Orders ==========

/// Cancel an order and refund through the ledger.
async fn cancel_order(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_service.cancel(&id).await?;
    Ok(ApiResponse::ok(order.into()))
}

// ========== Catalog ==========

/// Create a category.
async fn create_category(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryInput>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let category = state.catalog_service.create_category(req).await?;
    Ok(ApiResponse::ok(category.into()))
}

/// Update a category.
async fn update_category(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCategoryInput>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let category = state.catalog_service.update_category(&id, req).await?;
    Ok(ApiResponse::ok(category.into()))
}

/// Delete an unused category.
async fn delete_category(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.catalog_service.delete_category(&id).await?;
    Ok(ApiResponse::ok(()))
}

/// Create a course.
async fn create_course(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCourseInput>,
) -> AppResult<ApiResponse<CourseResponse>> {
    let course = state.catalog_service.create_course(req).await?;
    Ok(ApiResponse::ok(course.into()))
}

/// Update a course.
async fn update_course(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseInput>,
) -> AppResult<ApiResponse<CourseResponse>> {
    let course = state.catalog_service.update_course(&id, req).await?;
    Ok(ApiResponse::ok(course.into()))
}

/// Delete an unused course.
async fn delete_course(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.catalog_service.delete_course(&id).await?;
    Ok(ApiResponse::ok(()))
}

// ========== Statistics ==========

/// Platform statistics.
async fn statistics(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<StatisticsQuery>,
) -> AppResult<ApiResponse<StatisticsResponse>> {
    match query.kind.as_deref().unwrap_or("platform") {
        "platform" => {
            let stats = state.stats_service.platform().await?;
            Ok(ApiResponse::ok(StatisticsResponse::Platform(stats)))
        }
        "transaction" => {
            let breakdown = state.stats_service.transaction_breakdown(100).await?;
            Ok(ApiResponse::ok(StatisticsResponse::Transactions {
                breakdown,
            }))
        }
        other => Err(AppError::Validation(format!(
            "Unknown statistics type: {other}"
        ))),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user).put(update_user))
        .route("/postings", get(list_postings))
        .route("/postings/{id}", axum::routing::delete(remove_posting))
        .route("/reports", get(list_reports))
        .route("/reports/{id}", get(get_report).put(review_report))
        .route("/orders/{id}/cancel", post(cancel_order))
        .route("/categories", post(create_category))
        .route("/categories/{id}", put(update_category).delete(delete_category))
        .route("/courses", post(create_course))
        .route("/courses/{id}", put(update_course).delete(delete_course))
        .route("/statistics", get(statistics))
}
