//! Favorite listing endpoints.

use axum::{Router, extract::State, routing::get};
use bookmarket_common::AppResult;
use serde::Serialize;

use crate::{
    endpoints::postings::PostingResponse, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// A favorited posting with the bookmark timestamp.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub posting_id: String,
    pub added_at: String,
    pub posting: Option<PostingResponse>,
}

/// List the caller's favorites.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FavoriteResponse>>> {
    let favorites = state.favorite_service.list_for_user(&user.id).await?;

    // Postings that vanished since being favorited are returned without
    // a body rather than dropped, so clients can prune them.
    let mut results = Vec::with_capacity(favorites.len());
    for fav in favorites {
        let posting = state
            .posting_service
            .get(&fav.posting_id)
            .await
            .ok()
            .map(Into::into);

        results.push(FavoriteResponse {
            posting_id: fav.posting_id,
            added_at: fav.added_at.to_rfc3339(),
            posting,
        });
    }

    Ok(ApiResponse::ok(results))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}
