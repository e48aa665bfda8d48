//! Favorite repository.

use std::sync::Arc;

use crate::entities::{FavoritePost, favorite_post};
use bookmarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a favorite.
    pub async fn create(
        &self,
        model: favorite_post::ActiveModel,
    ) -> AppResult<favorite_post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find one favorite by its composite key.
    pub async fn find(
        &self,
        user_id: &str,
        posting_id: &str,
    ) -> AppResult<Option<favorite_post::Model>> {
        FavoritePost::find_by_id((user_id.to_string(), posting_id.to_string()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a favorite.
    pub async fn delete(&self, model: favorite_post::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List a user's favorites, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<favorite_post::Model>> {
        FavoritePost::find()
            .filter(favorite_post::Column::UserId.eq(user_id))
            .order_by_desc(favorite_post::Column::AddedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count favorites on a posting.
    pub async fn count_by_posting(&self, posting_id: &str) -> AppResult<u64> {
        FavoritePost::find()
            .filter(favorite_post::Column::PostingId.eq(posting_id))
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

    fn create_test_favorite(user_id: &str, posting_id: &str) -> favorite_post::Model {
        favorite_post::Model {
            user_id: user_id.to_string(),
            posting_id: posting_id.to_string(),
            added_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_hit() {
        let favorite = create_test_favorite("user1", "p1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[favorite]])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        let result = repo.find("user1", "p1").await.unwrap();

        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let favorites = vec![
            create_test_favorite("user1", "p2"),
            create_test_favorite("user1", "p1"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([favorites])
                .into_connection(),
        );

        let repo = FavoriteRepository::new(db);
        let result = repo.find_by_user("user1").await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
