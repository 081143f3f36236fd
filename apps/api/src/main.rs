mod auth;
mod chat;
mod compass;
mod config;
mod db;
mod errors;
mod llm_client;
mod mail;
mod models;
mod routes;
mod state;
mod streaming;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::SessionKeys;
use crate::chat::RedisChatStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::gemini::GeminiClient;
use crate::llm_client::registry::DEFAULT_MODEL;
use crate::llm_client::{ModelId, ModelRegistry};
use crate::mail::HttpMailer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Compass API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis: one multiplexed connection shared by every request
    let redis = redis::Client::open(config.redis_url.clone())?
        .get_multiplexed_async_connection()
        .await?;
    info!("Redis connection established");

    // Initialize model registry (Gemini serves the default provider)
    let gemini = GeminiClient::new(config.google_api_key.clone(), config.gemini_base_url.clone())?;
    let default_model = ModelId::parse(DEFAULT_MODEL)
        .ok_or_else(|| anyhow::anyhow!("invalid default model id '{DEFAULT_MODEL}'"))?;
    let models = ModelRegistry::new(default_model, Arc::new(gemini));
    info!("Model registry initialized (default: {})", models.default_model());

    let mailer = HttpMailer::new(
        config.mail_api_url.clone(),
        config.mail_api_key.clone(),
        config.mail_from.clone(),
    )?;

    // Build app state
    let state = AppState {
        db,
        models,
        chats: Arc::new(RedisChatStore::new(redis)),
        mailer: Arc::new(mailer),
        sessions: SessionKeys::new(config.jwt_secret.as_bytes()),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(config.request_timeout))
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
