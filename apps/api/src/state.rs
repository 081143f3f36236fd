use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::SessionKeys;
use crate::chat::ChatRepository;
use crate::config::Config;
use crate::llm_client::ModelRegistry;
use crate::mail::Mailer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Served providers; unknown model identifiers resolve to the default model.
    pub models: ModelRegistry,
    /// Chat history. Default: RedisChatStore over a multiplexed connection.
    pub chats: Arc<dyn ChatRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub sessions: SessionKeys,
    pub config: Config,
}
