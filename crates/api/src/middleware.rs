//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use bookmarket_common::config::MarketConfig;
use bookmarket_core::{
    CatalogService, CommentService, FavoriteService, LedgerService, MessagingService,
    ModerationService, OrderService, PostingService, ReviewService, StatsService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub ledger_service: LedgerService,
    pub posting_service: PostingService,
    pub order_service: OrderService,
    pub moderation_service: ModerationService,
    pub review_service: ReviewService,
    pub messaging_service: MessagingService,
    pub comment_service: CommentService,
    pub favorite_service: FavoriteService,
    pub catalog_service: CatalogService,
    pub stats_service: StatsService,
    pub market: MarketConfig,
}

impl AppState {
    /// Clamp a requested page size to the configured bounds.
    #[must_use]
    pub fn page_size(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.market.default_page_size)
            .clamp(1, self.market.max_page_size)
    }
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token into a user and stores it in the request
/// extensions. Invalid or missing tokens simply leave the request
/// unauthenticated; the extractors decide whether that is an error.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
