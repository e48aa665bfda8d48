//! Bookmarket server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use bookmarket_api::{middleware::AppState, router as api_router};
use bookmarket_common::Config;
use bookmarket_core::{
    CatalogService, CommentService, FavoriteService, LedgerService, MessagingService,
    ModerationService, OrderService, PostingService, ReviewService, StatsService, UserService,
};
use bookmarket_db::repositories::{
    CatalogRepository, CommentRepository, FavoriteRepository, LedgerRepository, MessageRepository,
    OrderRepository, PostingRepository, ReportRepository, ReviewRepository, StatsRepository,
    UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookmarket=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting bookmarket server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = bookmarket_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    bookmarket_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let ledger_repo = LedgerRepository::new(Arc::clone(&db));
    let posting_repo = PostingRepository::new(Arc::clone(&db));
    let order_repo = OrderRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let review_repo = ReviewRepository::new(Arc::clone(&db));
    let message_repo = MessageRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let favorite_repo = FavoriteRepository::new(Arc::clone(&db));
    let catalog_repo = CatalogRepository::new(Arc::clone(&db));
    let stats_repo = StatsRepository::new(Arc::clone(&db));

    // Initialize services; every workflow gets its collaborators
    // explicitly, no ambient globals.
    let user_service = UserService::new(user_repo.clone());
    let ledger_service = LedgerService::new(
        Arc::clone(&db),
        ledger_repo.clone(),
        config.market.max_top_up,
    );
    let posting_service = PostingService::new(posting_repo.clone(), catalog_repo.clone());
    let order_service = OrderService::new(
        Arc::clone(&db),
        order_repo.clone(),
        posting_repo.clone(),
        ledger_service.clone(),
    );
    let moderation_service = ModerationService::new(
        report_repo,
        posting_repo.clone(),
        comment_repo.clone(),
        order_repo.clone(),
        user_repo.clone(),
    );
    let review_service = ReviewService::new(review_repo, order_repo, posting_repo.clone());
    let messaging_service = MessagingService::new(message_repo, user_repo);
    let comment_service = CommentService::new(comment_repo, posting_repo.clone());
    let favorite_service = FavoriteService::new(favorite_repo, posting_repo);
    let catalog_service = CatalogService::new(catalog_repo);
    let stats_service = StatsService::new(stats_repo, review_service.clone());

    // Create app state
    let state = AppState {
        user_service,
        ledger_service,
        posting_service,
        order_service,
        moderation_service,
        review_service,
        messaging_service,
        comment_service,
        favorite_service,
        catalog_service,
        stats_service,
        market: config.market.clone(),
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            bookmarket_api::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
