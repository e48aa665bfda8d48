//! Direct message endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use bookmarket_common::AppResult;
use bookmarket_core::{ConversationSummary, SendMessageInput};
use bookmarket_db::entities::message;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// One message.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<message::Model> for MessageResponse {
    fn from(message: message::Model) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            content: message.content,
            is_read: message.is_read,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Conversation list entry.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub partner_id: String,
    pub partner_username: String,
    pub last_message: Option<MessageResponse>,
    pub unread_count: u64,
}

impl From<ConversationSummary> for ConversationResponse {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            partner_id: summary.partner_id,
            partner_username: summary.partner_username,
            last_message: summary.last_message.map(Into::into),
            unread_count: summary.unread_count,
        }
    }
}

/// Send request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub recipient_id: String,
    pub content: String,
}

/// Conversation page request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// Unread count payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

/// Send a message.
async fn send(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<ApiResponse<MessageResponse>> {
    let message = state
        .messaging_service
        .send_message(
            &user.id,
            SendMessageInput {
                recipient_id: req.recipient_id,
                content: req.content,
            },
        )
        .await?;

    Ok(ApiResponse::ok(message.into()))
}

/// List the caller's conversations.
async fn conversations(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ConversationResponse>>> {
    let summaries = state.messaging_service.get_conversations(&user.id, 50).await?;
    Ok(ApiResponse::ok(
        summaries.into_iter().map(Into::into).collect(),
    ))
}

/// Messages exchanged with one user, newest first.
async fn conversation(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(partner_id): Path<String>,
    Query(query): Query<ConversationQuery>,
) -> AppResult<ApiResponse<Vec<MessageResponse>>> {
    let limit = query.limit.min(state.market.max_page_size);
    let messages = state
        .messaging_service
        .get_conversation(&user.id, &partner_id, limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        messages.into_iter().map(Into::into).collect(),
    ))
}

/// Mark a conversation as read.
async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(partner_id): Path<String>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let updated = state
        .messaging_service
        .mark_conversation_read(&user.id, &partner_id)
        .await?;

    Ok(ApiResponse::ok(serde_json::json!({ "updated": updated })))
}

/// Total unread messages.
async fn unread_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UnreadCountResponse>> {
    let unread_count = state.messaging_service.unread_count(&user.id).await?;
    Ok(ApiResponse::ok(UnreadCountResponse { unread_count }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(send))
        .route("/conversations", get(conversations))
        .route("/unread-count", get(unread_count))
        .route("/with/{userId}", get(conversation))
        .route("/with/{userId}/read", post(mark_read))
}
