//! Standalone comment endpoints (edit and delete).

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::put,
};
use bookmarket_common::AppResult;
use serde::Deserialize;

use crate::{
    endpoints::postings::CommentResponse, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// Comment update request.
#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// Edit a comment.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.update(&id, &user.id, req.content).await?;
    Ok(ApiResponse::ok(comment.into()))
}

/// Delete a comment.
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .comment_service
        .delete(&id, &user.id, user.is_admin)
        .await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", put(update).delete(remove))
}
