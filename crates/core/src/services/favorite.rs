//! Favorite service.

use bookmarket_common::{AppError, AppResult};
use bookmarket_db::{
    entities::favorite_post,
    repositories::{FavoriteRepository, PostingRepository},
};
use sea_orm::Set;

/// Favorite service for bookmarked postings.
#[derive(Clone)]
pub struct FavoriteService {
    favorite_repo: FavoriteRepository,
    posting_repo: PostingRepository,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub const fn new(favorite_repo: FavoriteRepository, posting_repo: PostingRepository) -> Self {
        Self {
            favorite_repo,
            posting_repo,
        }
    }

    /// Add a posting to the user's favorites.
    pub async fn add(&self, user_id: &str, posting_id: &str) -> AppResult<favorite_post::Model> {
        // Posting must exist.
        self.posting_repo.get_by_id(posting_id).await?;

        if self.favorite_repo.find(user_id, posting_id).await?.is_some() {
            return Err(AppError::Conflict("Already in favorites".to_string()));
        }

        let model = favorite_post::ActiveModel {
            user_id: Set(user_id.to_string()),
            posting_id: Set(posting_id.to_string()),
            added_at: Set(chrono::Utc::now().into()),
        };

        self.favorite_repo.create(model).await
    }

    /// Remove a posting from the user's favorites.
    pub async fn remove(&self, user_id: &str, posting_id: &str) -> AppResult<()> {
        let favorite = self
            .favorite_repo
            .find(user_id, posting_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Not in favorites".to_string()))?;

        self.favorite_repo.delete(favorite).await
    }

    /// Whether a user has favorited a posting.
    pub async fn is_favorited(&self, user_id: &str, posting_id: &str) -> AppResult<bool> {
        Ok(self.favorite_repo.find(user_id, posting_id).await?.is_some())
    }

    /// List a user's favorites, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<favorite_post::Model>> {
        self.favorite_repo.find_by_user(user_id).await
    }

    /// Count favorites on a posting.
    pub async fn count_for_posting(&self, posting_id: &str) -> AppResult<u64> {
        self.favorite_repo.count_by_posting(posting_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bookmarket_db::entities::posting::{self, PostingStatus};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn build_service(db: Arc<DatabaseConnection>) -> FavoriteService {
        FavoriteService::new(
            FavoriteRepository::new(Arc::clone(&db)),
            PostingRepository::new(db),
        )
    }

    fn create_test_posting(id: &str) -> posting::Model {
        posting::Model {
            id: id.to_string(),
            user_id: "seller1".to_string(),
            title: "Discrete Mathematics".to_string(),
            description: None,
            price: 250,
            status: PostingStatus::Listed,
            category_id: None,
            course_id: None,
            image_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_add_duplicate_conflicts() {
        let posting = create_test_posting("p1");
        let existing = favorite_post::Model {
            user_id: "user1".to_string(),
            posting_id: "p1".to_string(),
            added_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[posting]])
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service.add("user1", "p1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_remove_missing_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<favorite_post::Model>::new()])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service.remove("user1", "p1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_is_favorited() {
        let existing = favorite_post::Model {
            user_id: "user1".to_string(),
            posting_id: "p1".to_string(),
            added_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([Vec::<favorite_post::Model>::new()])
                .into_connection(),
        );
        let service = build_service(db);

        assert!(service.is_favorited("user1", "p1").await.unwrap());
        assert!(!service.is_favorited("user1", "p2").await.unwrap());
    }
}
