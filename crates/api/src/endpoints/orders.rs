//! Order endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use bookmarket_common::AppResult;
use bookmarket_db::entities::order;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::page_offset,
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Paginated},
};

/// Purchase request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub posting_id: String,
}

/// Order record.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub buyer_id: String,
    pub posting_id: String,
    pub deal_price: i64,
    pub status: order::OrderStatus,
    pub created_at: String,
}

impl From<order::Model> for OrderResponse {
    fn from(order: order::Model) -> Self {
        Self {
            id: order.id,
            buyer_id: order.buyer_id,
            posting_id: order.posting_id,
            deal_price: order.deal_price,
            status: order.status,
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

/// Order list query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Purchase a posting.
async fn purchase(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PurchaseRequest>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_service.purchase(&user.id, &req.posting_id).await?;
    Ok(ApiResponse::ok(order.into()))
}

/// List the caller's orders.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> AppResult<ApiResponse<Paginated<OrderResponse>>> {
    let per_page = state.page_size(query.per_page);
    let (page, offset) = page_offset(query.page, per_page);

    let (orders, total) = state.order_service.list_orders(&user.id, per_page, offset).await?;

    Ok(ApiResponse::ok(Paginated {
        items: orders.into_iter().map(Into::into).collect(),
        total,
        page,
        per_page,
    }))
}

/// Order detail. Buyer, seller, or admin.
async fn get_one(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state
        .order_service
        .get_order(&id, &user.id, user.is_admin)
        .await?;
    Ok(ApiResponse::ok(order.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(purchase).get(list))
        .route("/{id}", get(get_one))
}
