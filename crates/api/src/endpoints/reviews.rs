//! Review endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use bookmarket_common::{AppError, AppResult};
use bookmarket_core::{SubmitReviewInput, UpdateReviewInput};
use bookmarket_db::entities::review;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::page_offset, extractors::AuthUser, middleware::AppState, response::ApiResponse,
};

/// Review record.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub order_id: String,
    pub reviewer_id: String,
    pub target_id: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<review::Model> for ReviewResponse {
    fn from(review: review::Model) -> Self {
        Self {
            id: review.id,
            order_id: review.order_id,
            reviewer_id: review.reviewer_id,
            target_id: review.target_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at.to_rfc3339(),
        }
    }
}

/// Review submission request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub order_id: String,
    pub rating: i16,
    pub comment: Option<String>,
}

/// Review update request.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: i16,
    pub comment: Option<String>,
}

/// Review list query: exactly one of `sellerId` or `reviewerId`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReviewsQuery {
    pub seller_id: Option<String>,
    pub reviewer_id: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Submit a review for an order.
async fn submit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SubmitReviewRequest>,
) -> AppResult<ApiResponse<ReviewResponse>> {
    let review = state
        .review_service
        .submit(
            &user.id,
            SubmitReviewInput {
                order_id: req.order_id,
                rating: req.rating,
                comment: req.comment,
            },
        )
        .await?;

    Ok(ApiResponse::ok(review.into()))
}

/// List reviews received by a seller or written by a reviewer.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListReviewsQuery>,
) -> AppResult<ApiResponse<Vec<ReviewResponse>>> {
    let per_page = state.page_size(query.per_page);
    let (_, offset) = page_offset(query.page, per_page);

    let reviews = match (&query.seller_id, &query.reviewer_id) {
        (Some(seller_id), None) => {
            state
                .review_service
                .list_for_seller(seller_id, per_page, offset)
                .await?
        }
        (None, Some(reviewer_id)) => {
            state
                .review_service
                .list_by_reviewer(reviewer_id, per_page, offset)
                .await?
        }
        _ => {
            return Err(AppError::Validation(
                "Provide exactly one of sellerId or reviewerId".to_string(),
            ));
        }
    };

    Ok(ApiResponse::ok(
        reviews.into_iter().map(Into::into).collect(),
    ))
}

/// The review for an order, if any.
async fn get_for_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> AppResult<ApiResponse<Option<ReviewResponse>>> {
    let review = state.review_service.get_for_order(&order_id).await?;
    Ok(ApiResponse::ok(review.map(Into::into)))
}

/// Update a review.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateReviewRequest>,
) -> AppResult<ApiResponse<ReviewResponse>> {
    let review = state
        .review_service
        .update(
            &id,
            &user.id,
            UpdateReviewInput {
                rating: req.rating,
                comment: req.comment,
            },
        )
        .await?;

    Ok(ApiResponse::ok(review.into()))
}

/// Delete a review.
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.review_service.delete(&id, &user.id).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit).get(list))
        .route("/order/{orderId}", get(get_for_order))
        .route("/{id}", put(update).delete(remove))
}
