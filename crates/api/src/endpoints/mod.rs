//! API endpoints.

mod admin;
mod auth;
mod catalog;
mod comments;
mod favorites;
mod messages;
mod orders;
mod postings;
mod reports;
mod reviews;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/postings", postings::router())
        .nest("/comments", comments::router())
        .nest("/favorites", favorites::router())
        .nest("/orders", orders::router())
        .nest("/reviews", reviews::router())
        .nest("/reports", reports::router())
        .nest("/messages", messages::router())
        .nest("/catalog", catalog::router())
        .nest("/admin", admin::router())
}

/// Resolve a 1-based page number into a row offset.
pub(crate) const fn page_offset(page: Option<u64>, per_page: u64) -> (u64, u64) {
    let page = match page {
        Some(p) if p >= 1 => p,
        _ => 1,
    };
    (page, (page - 1) * per_page)
}
