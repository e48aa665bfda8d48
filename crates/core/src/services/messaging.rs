//! Messaging service for direct messages between users.

use bookmarket_common::{AppError, AppResult, IdGenerator};
use bookmarket_db::{
    entities::message,
    repositories::{MessageRepository, UserRepository},
};
use sea_orm::Set;

const MAX_CONTENT_LEN: usize = 4000;

/// Input for sending a message.
pub struct SendMessageInput {
    pub recipient_id: String,
    pub content: String,
}

/// Conversation summary for listing.
pub struct ConversationSummary {
    pub partner_id: String,
    pub partner_username: String,
    pub last_message: Option<message::Model>,
    pub unread_count: u64,
}

/// Messaging service.
#[derive(Clone)]
pub struct MessagingService {
    message_repo: MessageRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl MessagingService {
    /// Create a new messaging service.
    #[must_use]
    pub const fn new(message_repo: MessageRepository, user_repo: UserRepository) -> Self {
        Self {
            message_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Send a message to another user.
    pub async fn send_message(
        &self,
        sender_id: &str,
        input: SendMessageInput,
    ) -> AppResult<message::Model> {
        let content = input.content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Message cannot be empty".to_string()));
        }
        if content.len() > MAX_CONTENT_LEN {
            return Err(AppError::Validation("Message too long".to_string()));
        }

        if sender_id == input.recipient_id {
            return Err(AppError::Validation(
                "Cannot send a message to yourself".to_string(),
            ));
        }

        // Recipient must exist.
        self.user_repo.get_by_id(&input.recipient_id).await?;

        let model = message::ActiveModel {
            id: Set(self.id_gen.generate()),
            sender_id: Set(sender_id.to_string()),
            recipient_id: Set(input.recipient_id),
            content: Set(content.to_string()),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.message_repo.create(model).await
    }

    /// Get messages in a conversation with another user, newest first.
    pub async fn get_conversation(
        &self,
        user_id: &str,
        partner_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<message::Model>> {
        self.message_repo
            .find_conversation(user_id, partner_id, limit, until_id)
            .await
    }

    /// Get the user's conversations, most recently active first.
    pub async fn get_conversations(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<ConversationSummary>> {
        let partner_ids = self
            .message_repo
            .find_conversation_partners(user_id, limit)
            .await?;

        let mut summaries = Vec::new();

        for partner_id in partner_ids {
            if let Some(partner) = self.user_repo.find_by_id(&partner_id).await? {
                let last_message = self
                    .message_repo
                    .find_latest_in_conversation(user_id, &partner_id)
                    .await?;

                let unread_count = self
                    .message_repo
                    .count_unread_from(user_id, &partner_id)
                    .await?;

                summaries.push(ConversationSummary {
                    partner_id: partner.id,
                    partner_username: partner.username,
                    last_message,
                    unread_count,
                });
            }
        }

        Ok(summaries)
    }

    /// Mark a conversation's incoming messages as read.
    pub async fn mark_conversation_read(
        &self,
        user_id: &str,
        partner_id: &str,
    ) -> AppResult<u64> {
        self.message_repo
            .mark_conversation_read(user_id, partner_id)
            .await
    }

    /// Total unread messages for a user.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.message_repo.count_unread(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn build_service(db: Arc<DatabaseConnection>) -> MessagingService {
        MessagingService::new(
            MessageRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_send_rejects_self_message() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = build_service(db);

        let result = service
            .send_message(
                "user1",
                SendMessageInput {
                    recipient_id: "user1".to_string(),
                    content: "hi me".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_send_rejects_empty_content() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = build_service(db);

        let result = service
            .send_message(
                "user1",
                SendMessageInput {
                    recipient_id: "user2".to_string(),
                    content: "   ".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_send_rejects_missing_recipient() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<bookmarket_db::entities::user::Model>::new()])
                .into_connection(),
        );
        let service = build_service(db);

        let result = service
            .send_message(
                "user1",
                SendMessageInput {
                    recipient_id: "ghost".to_string(),
                    content: "hello?".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }
}
