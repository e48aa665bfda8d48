//! Statistics service for the admin dashboard.

use crate::services::review::ReviewService;
use bookmarket_common::AppResult;
use bookmarket_db::repositories::{PlatformStats, StatsRepository, TransTypeBreakdown, UserStats};
use serde::Serialize;

/// Per-user statistics enriched with the seller rating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    #[serde(flatten)]
    pub activity: UserStats,
    /// Mean received rating, one decimal; absent with no reviews.
    pub average_rating: Option<f64>,
    pub review_count: u64,
}

/// Statistics service.
#[derive(Clone)]
pub struct StatsService {
    stats_repo: StatsRepository,
    review_service: ReviewService,
}

impl StatsService {
    /// Create a new statistics service.
    #[must_use]
    pub const fn new(stats_repo: StatsRepository, review_service: ReviewService) -> Self {
        Self {
            stats_repo,
            review_service,
        }
    }

    /// Platform-wide totals.
    pub async fn platform(&self) -> AppResult<PlatformStats> {
        self.stats_repo.platform().await
    }

    /// Activity and rating statistics for one user.
    pub async fn for_user(&self, user_id: &str) -> AppResult<UserStatistics> {
        let activity = self.stats_repo.for_user(user_id).await?;
        let average_rating = self.review_service.average_rating(user_id).await?;
        let review_count = self.review_service.review_count(user_id).await?;

        Ok(UserStatistics {
            activity,
            average_rating,
            review_count,
        })
    }

    /// Count and volume per transaction type over the most recent records.
    pub async fn transaction_breakdown(&self, limit: u64) -> AppResult<Vec<TransTypeBreakdown>> {
        self.stats_repo.transaction_breakdown(limit).await
    }
}
