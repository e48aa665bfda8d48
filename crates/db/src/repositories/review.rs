//! Review repository.

use std::sync::Arc;

use crate::entities::{Review, review};
use bookmarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Alias, Expr},
};

#[derive(FromQueryResult)]
struct RatingSum {
    total: Option<i64>,
}

/// Review repository for database operations.
#[derive(Clone)]
pub struct ReviewRepository {
    db: Arc<DatabaseConnection>,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new review.
    pub async fn create(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a review by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<review::Model> {
        Review::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Review {id} not found")))
    }

    /// Find the review for an order, if any.
    pub async fn find_by_order(&self, order_id: &str) -> AppResult<Option<review::Model>> {
        Review::find()
            .filter(review::Column::OrderId.eq(order_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List reviews received by a seller, newest first.
    pub async fn find_by_target(
        &self,
        target_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::TargetId.eq(target_id))
            .order_by_desc(review::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List reviews written by a user, newest first.
    pub async fn find_by_reviewer(
        &self,
        reviewer_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::ReviewerId.eq(reviewer_id))
            .order_by_desc(review::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a review.
    pub async fn update(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a review.
    pub async fn delete(&self, model: review::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Average rating received by a user, recomputed on every read.
    ///
    /// `None` when the user has no reviews.
    pub async fn average_rating(&self, target_id: &str) -> AppResult<Option<f64>> {
        // SUM over smallint yields bigint, but cast explicitly so the
        // mapping onto i64 cannot drift with the column type.
        let sum = Review::find()
            .select_only()
            .column_as(
                Expr::col(review::Column::Rating)
                    .sum()
                    .cast_as(Alias::new("BIGINT")),
                "total",
            )
            .filter(review::Column::TargetId.eq(target_id))
            .into_model::<RatingSum>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = self.count_by_target(target_id).await?;
        if count == 0 {
            return Ok(None);
        }

        Ok(sum
            .and_then(|s| s.total)
            .map(|total| total as f64 / count as f64))
    }

    /// Count reviews received by a user.
    pub async fn count_by_target(&self, target_id: &str) -> AppResult<u64> {
        Review::find()
            .filter(review::Column::TargetId.eq(target_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_review(id: &str, order_id: &str, rating: i16) -> review::Model {
        review::Model {
            id: id.to_string(),
            order_id: order_id.to_string(),
            reviewer_id: "buyer1".to_string(),
            target_id: "seller1".to_string(),
            rating,
            comment: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_order_hit() {
        let review = create_test_review("rev1", "o1", 5);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[review]])
                .into_connection(),
        );

        let repo = ReviewRepository::new(db);
        let result = repo.find_by_order("o1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().rating, 5);
    }

    #[tokio::test]
    async fn test_find_by_target() {
        let reviews = vec![
            create_test_review("rev1", "o1", 5),
            create_test_review("rev2", "o2", 4),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([reviews])
                .into_connection(),
        );

        let repo = ReviewRepository::new(db);
        let result = repo.find_by_target("seller1", 20, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
