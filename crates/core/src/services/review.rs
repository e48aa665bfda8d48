//! Review service.

use bookmarket_common::{AppError, AppResult, IdGenerator};
use bookmarket_db::{
    entities::review,
    repositories::{OrderRepository, PostingRepository, ReviewRepository},
};
use sea_orm::Set;

const MAX_COMMENT_LEN: usize = 2000;

/// Input for submitting a review.
pub struct SubmitReviewInput {
    pub order_id: String,
    pub rating: i16,
    pub comment: Option<String>,
}

/// Input for updating a review.
pub struct UpdateReviewInput {
    pub rating: i16,
    pub comment: Option<String>,
}

/// Review service: one buyer review per completed order.
#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    order_repo: OrderRepository,
    posting_repo: PostingRepository,
    id_gen: IdGenerator,
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub const fn new(
        review_repo: ReviewRepository,
        order_repo: OrderRepository,
        posting_repo: PostingRepository,
    ) -> Self {
        Self {
            review_repo,
            order_repo,
            posting_repo,
            id_gen: IdGenerator::new(),
        }
    }

    fn validate_rating(rating: i16) -> AppResult<()> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::Validation(
                "Rating must be an integer between 1 and 5".to_string(),
            ));
        }
        Ok(())
    }

    fn normalize_comment(comment: Option<String>) -> AppResult<Option<String>> {
        match comment {
            None => Ok(None),
            Some(c) => {
                let trimmed = c.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                if trimmed.len() > MAX_COMMENT_LEN {
                    return Err(AppError::Validation("Review comment too long".to_string()));
                }
                Ok(Some(trimmed.to_string()))
            }
        }
    }

    /// Submit a review for an order. Only the buyer may review, once.
    pub async fn submit(
        &self,
        reviewer_id: &str,
        input: SubmitReviewInput,
    ) -> AppResult<review::Model> {
        Self::validate_rating(input.rating)?;
        let comment = Self::normalize_comment(input.comment)?;

        let order = self.order_repo.get_by_id(&input.order_id).await?;

        if order.buyer_id != reviewer_id {
            return Err(AppError::Forbidden(
                "Only the buyer can review this order".to_string(),
            ));
        }

        let posting = self.posting_repo.get_by_id(&order.posting_id).await?;
        let target_id = posting.user_id;

        // Cannot normally occur: self-purchase is rejected at purchase
        // time, so an order's buyer is never its seller.
        if target_id == reviewer_id {
            return Err(AppError::Validation("You cannot review yourself".to_string()));
        }

        if self.review_repo.find_by_order(&input.order_id).await?.is_some() {
            return Err(AppError::Conflict(
                "This order has already been reviewed".to_string(),
            ));
        }

        let model = review::ActiveModel {
            id: Set(self.id_gen.generate()),
            order_id: Set(input.order_id),
            reviewer_id: Set(reviewer_id.to_string()),
            target_id: Set(target_id),
            rating: Set(input.rating),
            comment: Set(comment),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.review_repo.create(model).await
    }

    /// Update a review. Author-only.
    pub async fn update(
        &self,
        review_id: &str,
        reviewer_id: &str,
        input: UpdateReviewInput,
    ) -> AppResult<review::Model> {
        Self::validate_rating(input.rating)?;
        let comment = Self::normalize_comment(input.comment)?;

        let review = self.review_repo.get_by_id(review_id).await?;

        if review.reviewer_id != reviewer_id {
            return Err(AppError::Forbidden(
                "Only the author can modify this review".to_string(),
            ));
        }

        let mut active: review::ActiveModel = review.into();
        active.rating = Set(input.rating);
        active.comment = Set(comment);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.review_repo.update(active).await
    }

    /// Delete a review. Author-only.
    pub async fn delete(&self, review_id: &str, reviewer_id: &str) -> AppResult<()> {
        let review = self.review_repo.get_by_id(review_id).await?;

        if review.reviewer_id != reviewer_id {
            return Err(AppError::Forbidden(
                "Only the author can delete this review".to_string(),
            ));
        }

        self.review_repo.delete(review).await
    }

    /// Average rating received by a user, rounded to one decimal.
    /// Recomputed on every read, never cached.
    pub async fn average_rating(&self, user_id: &str) -> AppResult<Option<f64>> {
        let avg = self.review_repo.average_rating(user_id).await?;
        Ok(avg.map(|a| (a * 10.0).round() / 10.0))
    }

    /// Count reviews received by a user.
    pub async fn review_count(&self, user_id: &str) -> AppResult<u64> {
        self.review_repo.count_by_target(user_id).await
    }

    /// List reviews received by a seller.
    pub async fn list_for_seller(
        &self,
        target_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<review::Model>> {
        self.review_repo.find_by_target(target_id, limit, offset).await
    }

    /// List reviews written by a user.
    pub async fn list_by_reviewer(
        &self,
        reviewer_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<review::Model>> {
        self.review_repo
            .find_by_reviewer(reviewer_id, limit, offset)
            .await
    }

    /// The review for an order, if any.
    pub async fn get_for_order(&self, order_id: &str) -> AppResult<Option<review::Model>> {
        self.review_repo.find_by_order(order_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bookmarket_db::entities::order::{self, OrderStatus};
    use bookmarket_db::entities::posting::{self, PostingStatus};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn build_service(db: Arc<DatabaseConnection>) -> ReviewService {
        ReviewService::new(
            ReviewRepository::new(Arc::clone(&db)),
            OrderRepository::new(Arc::clone(&db)),
            PostingRepository::new(db),
        )
    }

    fn create_test_order(id: &str, buyer: &str) -> order::Model {
        order::Model {
            id: id.to_string(),
            buyer_id: buyer.to_string(),
            posting_id: "p1".to_string(),
            deal_price: 300,
            status: OrderStatus::Completed,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_posting(seller: &str) -> posting::Model {
        posting::Model {
            id: "p1".to_string(),
            user_id: seller.to_string(),
            title: "Organic Chemistry".to_string(),
            description: None,
            price: 300,
            status: PostingStatus::Sold,
            category_id: None,
            course_id: None,
            image_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_review(id: &str, order_id: &str) -> review::Model {
        review::Model {
            id: id.to_string(),
            order_id: order_id.to_string(),
            reviewer_id: "buyer1".to_string(),
            target_id: "seller1".to_string(),
            rating: 4,
            comment: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_rating() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = build_service(db);

        for rating in [0, 6, -1] {
            let result = service
                .submit(
                    "buyer1",
                    SubmitReviewInput {
                        order_id: "o1".to_string(),
                        rating,
                        comment: None,
                    },
                )
                .await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_submit_rejects_non_buyer() {
        let order = create_test_order("o1", "buyer1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[order]])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service
            .submit(
                "someone_else",
                SubmitReviewInput {
                    order_id: "o1".to_string(),
                    rating: 5,
                    comment: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_submit_duplicate_review_conflicts() {
        let order = create_test_order("o1", "buyer1");
        let posting = create_test_posting("seller1");
        let existing = create_test_review("rev1", "o1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[order]])
                .append_query_results([[posting]])
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service
            .submit(
                "buyer1",
                SubmitReviewInput {
                    order_id: "o1".to_string(),
                    rating: 5,
                    comment: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_non_author() {
        let review = create_test_review("rev1", "o1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[review]])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service
            .update(
                "rev1",
                "intruder",
                UpdateReviewInput {
                    rating: 1,
                    comment: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_average_rounding() {
        // 4.333... rounds to one decimal
        let avg = 13.0 / 3.0;
        let rounded = (avg * 10.0_f64).round() / 10.0;
        assert!((rounded - 4.3).abs() < f64::EPSILON);
    }
}
