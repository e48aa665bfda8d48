//! Comment service.

use bookmarket_common::{AppError, AppResult, IdGenerator};
use bookmarket_db::{
    entities::comment,
    repositories::{CommentRepository, PostingRepository},
};
use sea_orm::Set;

const MAX_CONTENT_LEN: usize = 2000;

/// Input for creating a comment.
pub struct CreateCommentInput {
    pub posting_id: String,
    pub content: String,
}

/// Comment service for posting discussions.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    posting_repo: PostingRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, posting_repo: PostingRepository) -> Self {
        Self {
            comment_repo,
            posting_repo,
            id_gen: IdGenerator::new(),
        }
    }

    fn validate_content(content: &str) -> AppResult<&str> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }
        if trimmed.len() > MAX_CONTENT_LEN {
            return Err(AppError::Validation("Comment too long".to_string()));
        }
        Ok(trimmed)
    }

    /// Leave a comment on a posting.
    pub async fn create(
        &self,
        author_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        let content = Self::validate_content(&input.content)?;

        // Posting must exist.
        self.posting_repo.get_by_id(&input.posting_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            posting_id: Set(input.posting_id),
            user_id: Set(author_id.to_string()),
            content: Set(content.to_string()),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.comment_repo.create(model).await
    }

    /// List a posting's comments, oldest first.
    pub async fn list_for_posting(&self, posting_id: &str) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_by_posting(posting_id).await
    }

    /// Get a comment by ID.
    pub async fn get(&self, id: &str) -> AppResult<comment::Model> {
        self.comment_repo.get_by_id(id).await
    }

    /// Edit a comment. Author-only.
    pub async fn update(
        &self,
        comment_id: &str,
        author_id: &str,
        content: String,
    ) -> AppResult<comment::Model> {
        let content = Self::validate_content(&content)?.to_string();

        let comment = self.comment_repo.get_by_id(comment_id).await?;
        if comment.user_id != author_id {
            return Err(AppError::Forbidden(
                "Only the author can edit this comment".to_string(),
            ));
        }

        let mut active: comment::ActiveModel = comment.into();
        active.content = Set(content);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.comment_repo.update(active).await
    }

    /// Delete a comment. Author or admin.
    pub async fn delete(
        &self,
        comment_id: &str,
        requester_id: &str,
        requester_is_admin: bool,
    ) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        if comment.user_id != requester_id && !requester_is_admin {
            return Err(AppError::Forbidden(
                "Only the author or an administrator can delete this comment".to_string(),
            ));
        }

        self.comment_repo.delete(comment).await
    }

    /// Count comments on a posting.
    pub async fn count_for_posting(&self, posting_id: &str) -> AppResult<u64> {
        self.comment_repo.count_by_posting(posting_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn build_service(db: Arc<DatabaseConnection>) -> CommentService {
        CommentService::new(
            CommentRepository::new(Arc::clone(&db)),
            PostingRepository::new(db),
        )
    }

    fn create_test_comment(id: &str, author: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            posting_id: "p1".to_string(),
            user_id: author.to_string(),
            content: "Is this still available?".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = build_service(db);

        let result = service
            .create(
                "user1",
                CreateCommentInput {
                    posting_id: "p1".to_string(),
                    content: "  \n ".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_non_author() {
        let comment = create_test_comment("c1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service.update("c1", "intruder", "edited".to_string()).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_allows_admin() {
        let comment = create_test_comment("c1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .append_exec_results([sea_orm::MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service.delete("c1", "admin1", true).await;
        assert!(result.is_ok());
    }
}
