//! Message repository.

use std::sync::Arc;

use crate::entities::{Message, message};
use bookmarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

/// Message repository for database operations.
#[derive(Clone)]
pub struct MessageRepository {
    db: Arc<DatabaseConnection>,
}

impl MessageRepository {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new message.
    pub async fn create(&self, model: message::ActiveModel) -> AppResult<message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a message by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<message::Model>> {
        Message::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn between(user_id: &str, partner_id: &str) -> Condition {
        // Messages sent by user to partner OR by partner to user
        Condition::any()
            .add(
                Condition::all()
                    .add(message::Column::SenderId.eq(user_id))
                    .add(message::Column::RecipientId.eq(partner_id)),
            )
            .add(
                Condition::all()
                    .add(message::Column::SenderId.eq(partner_id))
                    .add(message::Column::RecipientId.eq(user_id)),
            )
    }

    /// Find messages in a conversation between two users, newest first.
    pub async fn find_conversation(
        &self,
        user_id: &str,
        partner_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<message::Model>> {
        let mut query = Message::find()
            .filter(Self::between(user_id, partner_id))
            .order_by_desc(message::Column::CreatedAt);

        if let Some(until) = until_id {
            // Get messages older than the specified ID
            if let Some(until_msg) = self.find_by_id(until).await? {
                query = query.filter(message::Column::CreatedAt.lt(until_msg.created_at));
            }
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Latest message in a conversation, if any.
    pub async fn find_latest_in_conversation(
        &self,
        user_id: &str,
        partner_id: &str,
    ) -> AppResult<Option<message::Model>> {
        Message::find()
            .filter(Self::between(user_id, partner_id))
            .order_by_desc(message::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get conversation partners for a user (users they've messaged or
    /// been messaged by).
    pub async fn find_conversation_partners(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<String>> {
        use sea_orm::{ConnectionTrait, Statement};

        // Unique partner IDs from both sent and received messages,
        // most recent conversation first.
        let sql = format!(
            r"
            SELECT partner_id FROM (
                SELECT
                    CASE WHEN sender_id = $1 THEN recipient_id ELSE sender_id END AS partner_id,
                    MAX(created_at) AS last_at
                FROM message
                WHERE sender_id = $1 OR recipient_id = $1
                GROUP BY partner_id
            ) AS partners
            ORDER BY last_at DESC
            LIMIT {limit}
            "
        );

        let result = self
            .db
            .query_all(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                &sql,
                [user_id.into()],
            ))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut partners = Vec::new();
        for row in result {
            if let Ok(partner_id) = row.try_get::<String>("", "partner_id") {
                partners.push(partner_id);
            }
        }

        Ok(partners)
    }

    /// Get unread message count for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        Message::find()
            .filter(message::Column::RecipientId.eq(user_id))
            .filter(message::Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get unread message count from a specific user.
    pub async fn count_unread_from(&self, user_id: &str, partner_id: &str) -> AppResult<u64> {
        Message::find()
            .filter(message::Column::SenderId.eq(partner_id))
            .filter(message::Column::RecipientId.eq(user_id))
            .filter(message::Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a conversation's incoming messages as read. Returns the number
    /// of messages updated.
    pub async fn mark_conversation_read(
        &self,
        user_id: &str,
        partner_id: &str,
    ) -> AppResult<u64> {
        let result = Message::update_many()
            .col_expr(message::Column::IsRead, Expr::value(true))
            .filter(message::Column::SenderId.eq(partner_id))
            .filter(message::Column::RecipientId.eq(user_id))
            .filter(message::Column::IsRead.eq(false))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_message(id: &str, sender: &str, recipient: &str) -> message::Model {
        message::Model {
            id: id.to_string(),
            sender_id: sender.to_string(),
            recipient_id: recipient.to_string(),
            content: "hello".to_string(),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_conversation() {
        let messages = vec![
            create_test_message("m2", "user2", "user1"),
            create_test_message("m1", "user1", "user2"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([messages])
                .into_connection(),
        );

        let repo = MessageRepository::new(db);
        let result = repo
            .find_conversation("user1", "user2", 20, None)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_mark_conversation_read() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );

        let repo = MessageRepository::new(db);
        let updated = repo.mark_conversation_read("user1", "user2").await.unwrap();

        assert_eq!(updated, 3);
    }
}
