//! Axum route handlers for the career chat and its saved history.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::Utc;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use super::models::{Chat, ChatMessage, ChatRole};
use super::prompts::{CAREER_ASSISTANT, CHAT_SAMPLING};
use super::related::RelatedQuestions;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::llm_client::prompts::with_current_date;
use crate::llm_client::registry::DEFAULT_MODEL;
use crate::llm_client::Prompt;
use crate::state::AppState;
use crate::streaming::{
    data_stream_response, relay_with_enrichment, Completion, OnFinish, SmoothOptions,
};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatsResponse {
    pub chats: Vec<Chat>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub chat: Chat,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Saves the request messages plus the finished assistant reply.
fn save_on_finish(state: &AppState, chat_id: String, user_id: Uuid, messages: Vec<ChatMessage>) -> OnFinish {
    let chats = Arc::clone(&state.chats);
    Box::new(move |completion: Completion| {
        async move {
            let mut messages = messages;
            messages.push(ChatMessage {
                role: ChatRole::Assistant,
                content: completion.text,
                annotations: completion.annotations,
            });
            let chat = Chat::new(chat_id, user_id, messages, Utc::now());
            if let Err(e) = chats.save(&chat).await {
                error!("Failed to save chat {}: {e}", chat.id);
            }
        }
        .boxed()
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/chat
///
/// Streams the assistant reply as a data stream, then three related questions on the
/// annotation channel. Signed-in users get the exchange saved once the stream finishes.
pub async fn handle_chat(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, AppError> {
    if request.messages.is_empty() {
        return Err(AppError::Validation("At least one message is required".to_string()));
    }

    let chat_id = request
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let model = state
        .models
        .resolve(request.model.as_deref().unwrap_or(DEFAULT_MODEL));

    let prompt = Prompt {
        system: Some(with_current_date(CAREER_ASSISTANT, Utc::now().date_naive())),
        messages: request
            .messages
            .iter()
            .map(ChatMessage::to_prompt_message)
            .collect(),
        sampling: CHAT_SAMPLING,
    };

    info!(
        "Chat {chat_id}: {} messages, model {}",
        request.messages.len(),
        model.id()
    );
    let deadline = Instant::now() + state.config.request_timeout;
    let primary = model.stream_text(&prompt).await?;

    let related = Arc::new(RelatedQuestions::new(state.models.resolve_default()));
    let on_finish =
        user.map(|user| save_on_finish(&state, chat_id, user.user_id, request.messages));

    Ok(data_stream_response(relay_with_enrichment(
        primary,
        Some(SmoothOptions::words(state.config.smooth_delay)),
        related,
        on_finish,
        deadline,
    )))
}

/// GET /api/chats
pub async fn handle_list_chats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ChatsResponse>, AppError> {
    let chats = state.chats.list(user.user_id).await?;
    Ok(Json(ChatsResponse { chats }))
}

/// GET /api/chats/:id
pub async fn handle_get_chat(
    State(state): State<AppState>,
    user: AuthUser,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatResponse>, AppError> {
    let chat = state
        .chats
        .get(user.user_id, &chat_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;
    Ok(Json(ChatResponse { chat }))
}

/// DELETE /api/chats/:id
pub async fn handle_delete_chat(
    State(state): State<AppState>,
    user: AuthUser,
    Path(chat_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !state.chats.delete(user.user_id, &chat_id).await? {
        return Err(AppError::NotFound("Chat not found".to_string()));
    }
    info!("Deleted chat {chat_id}");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/chats
pub async fn handle_clear_chats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    state.chats.clear(user.user_id).await?;
    info!("Cleared chat history for user {}", user.user_id);
    Ok(StatusCode::NO_CONTENT)
}
