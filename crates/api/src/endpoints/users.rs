//! User profile and wallet endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use bookmarket_common::AppResult;
use bookmarket_core::UpdateProfileInput;
use bookmarket_db::entities::{transaction_record, user};
use serde::{Deserialize, Serialize};

use crate::{endpoints::page_offset, extractors::AuthUser, middleware::AppState, response::{ApiResponse, Paginated}};

/// Public view of a user.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserResponse {
    pub id: String,
    pub username: String,
    pub average_rating: Option<f64>,
    pub review_count: u64,
    pub created_at: String,
}

/// Wallet balance.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub balance: i64,
}

/// Top-up request.
#[derive(Debug, Deserialize)]
pub struct TopUpRequest {
    pub amount: i64,
}

/// One ledger entry.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    pub amount: i64,
    pub trans_type: transaction_record::TransType,
    pub created_at: String,
}

impl From<transaction_record::Model> for TransactionResponse {
    fn from(record: transaction_record::Model) -> Self {
        Self {
            id: record.id,
            amount: record.amount,
            trans_type: record.trans_type,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// Transaction list request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    #[serde(rename = "type")]
    pub trans_type: Option<transaction_record::TransType>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

fn public_profile(
    user: &user::Model,
    average_rating: Option<f64>,
    review_count: u64,
) -> PublicUserResponse {
    PublicUserResponse {
        id: user.id.clone(),
        username: user.username.clone(),
        average_rating,
        review_count,
        created_at: user.created_at.to_rfc3339(),
    }
}

/// Public profile with the seller's aggregate rating.
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PublicUserResponse>> {
    let user = state.user_service.get(&id).await?;
    let average_rating = state.review_service.average_rating(&id).await?;
    let review_count = state.review_service.review_count(&id).await?;

    Ok(ApiResponse::ok(public_profile(
        &user,
        average_rating,
        review_count,
    )))
}

/// A user's aggregate rating alone.
async fn get_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    // Existence check keeps 404 semantics for unknown users.
    state.user_service.get(&id).await?;

    let average_rating = state.review_service.average_rating(&id).await?;
    let review_count = state.review_service.review_count(&id).await?;

    Ok(ApiResponse::ok(serde_json::json!({
        "averageRating": average_rating,
        "reviewCount": review_count,
    })))
}

/// Update the caller's own profile.
async fn update_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<PublicUserResponse>> {
    let updated = state.user_service.update_profile(&user.id, req).await?;
    let average_rating = state.review_service.average_rating(&updated.id).await?;
    let review_count = state.review_service.review_count(&updated.id).await?;

    Ok(ApiResponse::ok(public_profile(
        &updated,
        average_rating,
        review_count,
    )))
}

/// Top up the caller's wallet.
async fn top_up(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<TopUpRequest>,
) -> AppResult<ApiResponse<BalanceResponse>> {
    let balance = state.ledger_service.top_up(&user.id, req.amount).await?;
    Ok(ApiResponse::ok(BalanceResponse { balance }))
}

/// The caller's wallet balance.
async fn balance(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<BalanceResponse>> {
    let balance = state.ledger_service.get_balance(&user.id).await?;
    Ok(ApiResponse::ok(BalanceResponse { balance }))
}

/// The caller's transaction history.
async fn transactions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> AppResult<ApiResponse<Paginated<TransactionResponse>>> {
    let per_page = state.page_size(query.per_page);
    let (page, offset) = page_offset(query.page, per_page);

    let (records, total) = state
        .ledger_service
        .list_transactions(&user.id, query.trans_type, per_page, offset)
        .await?;

    Ok(ApiResponse::ok(Paginated {
        items: records.into_iter().map(Into::into).collect(),
        total,
        page,
        per_page,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/topup", post(top_up))
        .route("/balance", get(balance))
        .route("/transactions", get(transactions))
        .route("/profile", put(update_profile))
        .route("/{id}", get(get_user))
        .route("/{id}/rating", get(get_rating))
}
