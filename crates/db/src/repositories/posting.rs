//! Posting repository.

use std::sync::Arc;

use crate::entities::{
    Comment, FavoritePost, Posting, PostingImage, comment, favorite_post,
    posting::{self, PostingStatus},
    posting_image,
};
use bookmarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

/// Filters accepted by [`PostingRepository::search`].
#[derive(Debug, Clone, Default)]
pub struct PostingSearchFilter {
    pub status: Option<PostingStatus>,
    pub user_id: Option<String>,
    pub category_id: Option<String>,
    pub course_id: Option<String>,
    /// Substring match on title and description.
    pub keyword: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

/// Posting repository for database operations.
#[derive(Clone)]
pub struct PostingRepository {
    db: Arc<DatabaseConnection>,
}

impl PostingRepository {
    /// Create a new posting repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new posting.
    pub async fn create(&self, model: posting::ActiveModel) -> AppResult<posting::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a posting by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<posting::Model>> {
        Posting::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a posting by ID, failing when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<posting::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Posting {id} not found")))
    }

    /// Find a posting inside a caller-owned transaction.
    pub async fn find_by_id_on<C>(&self, conn: &C, id: &str) -> AppResult<Option<posting::Model>>
    where
        C: ConnectionTrait,
    {
        Posting::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Compare-and-swap a posting from `listed` to `sold`.
    ///
    /// The status filter is the whole point: under two concurrent buyers
    /// exactly one update matches the `listed` row, so the caller can take
    /// zero rows affected as "somebody else got there first" and abort.
    pub async fn mark_sold_if_listed<C>(&self, conn: &C, id: &str) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let result = Posting::update_many()
            .col_expr(posting::Column::Status, Expr::value(PostingStatus::Sold))
            .col_expr(
                posting::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(posting::Column::Id.eq(id))
            .filter(posting::Column::Status.eq(PostingStatus::Listed))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Update a posting.
    pub async fn update(&self, model: posting::ActiveModel) -> AppResult<posting::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search postings with filters, newest first.
    pub async fn search(
        &self,
        filter: &PostingSearchFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<posting::Model>> {
        self.filtered(filter)
            .order_by_desc(posting::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count postings matching the filters.
    pub async fn count(&self, filter: &PostingSearchFilter) -> AppResult<u64> {
        self.filtered(filter)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn filtered(&self, filter: &PostingSearchFilter) -> sea_orm::Select<Posting> {
        let mut query = Posting::find();

        if let Some(status) = filter.status {
            query = query.filter(posting::Column::Status.eq(status));
        }
        if let Some(ref user_id) = filter.user_id {
            query = query.filter(posting::Column::UserId.eq(user_id));
        }
        if let Some(ref category_id) = filter.category_id {
            query = query.filter(posting::Column::CategoryId.eq(category_id));
        }
        if let Some(ref course_id) = filter.course_id {
            query = query.filter(posting::Column::CourseId.eq(course_id));
        }
        if let Some(ref keyword) = filter.keyword {
            let pattern = format!("%{keyword}%");
            query = query.filter(
                Condition::any()
                    .add(posting::Column::Title.like(&pattern))
                    .add(posting::Column::Description.like(&pattern)),
            );
        }
        if let Some(min) = filter.min_price {
            query = query.filter(posting::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(posting::Column::Price.lte(max));
        }

        query
    }

    /// Count postings by status.
    pub async fn count_by_status(&self, status: PostingStatus) -> AppResult<u64> {
        Posting::find()
            .filter(posting::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ========== Images ==========

    /// Attach an image to a posting.
    pub async fn add_image(
        &self,
        model: posting_image::ActiveModel,
    ) -> AppResult<posting_image::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a posting's images in display order.
    pub async fn get_images(&self, posting_id: &str) -> AppResult<Vec<posting_image::Model>> {
        PostingImage::find()
            .filter(posting_image::Column::PostingId.eq(posting_id))
            .order_by_asc(posting_image::Column::DisplayOrder)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a gallery image by ID.
    pub async fn find_image(&self, image_id: &str) -> AppResult<Option<posting_image::Model>> {
        PostingImage::find_by_id(image_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a gallery image.
    pub async fn delete_image(&self, model: posting_image::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ========== Engagement counts ==========

    /// Number of favorites on a posting.
    pub async fn favorite_count(&self, posting_id: &str) -> AppResult<u64> {
        FavoritePost::find()
            .filter(favorite_post::Column::PostingId.eq(posting_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of comments on a posting.
    pub async fn comment_count(&self, posting_id: &str) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::PostingId.eq(posting_id))
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
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_posting(id: &str, status: PostingStatus) -> posting::Model {
        posting::Model {
            id: id.to_string(),
            user_id: "seller1".to_string(),
            title: "Linear Algebra, 5th ed.".to_string(),
            description: None,
            price: 300,
            status,
            category_id: None,
            course_id: None,
            image_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_mark_sold_if_listed_cas_loses() {
        // Another buyer already flipped the row; the conditional update
        // matches nothing.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = PostingRepository::new(Arc::clone(&db));
        let rows = repo.mark_sold_if_listed(db.as_ref(), "p1").await.unwrap();

        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_mark_sold_if_listed_cas_wins() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PostingRepository::new(Arc::clone(&db));
        let rows = repo.mark_sold_if_listed(db.as_ref(), "p1").await.unwrap();

        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_search_returns_rows() {
        let postings = vec![
            create_test_posting("p1", PostingStatus::Listed),
            create_test_posting("p2", PostingStatus::Listed),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([postings])
                .into_connection(),
        );

        let repo = PostingRepository::new(db);
        let filter = PostingSearchFilter {
            status: Some(PostingStatus::Listed),
            ..Default::default()
        };
        let result = repo.search(&filter, 20, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<posting::Model>::new()])
                .into_connection(),
        );

        let repo = PostingRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
