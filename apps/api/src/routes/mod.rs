pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::chat::handlers as chat;
use crate::compass::handlers as compass;
use crate::state::AppState;

/// Resume uploads are capped at 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Career Compass
        .route("/api/career-compass", post(compass::handle_career_compass))
        .route(
            "/api/career-compass/structured",
            post(compass::handle_structured_compass),
        )
        .route(
            "/api/career-compass/validate-resume",
            post(compass::handle_validate_resume),
        )
        .route(
            "/api/career-compass/save-report",
            post(compass::handle_save_report),
        )
        .route("/api/career-compass/load", get(compass::handle_load_report))
        .route(
            "/api/career-compass-manual",
            post(compass::handle_manual_markdown),
        )
        .route(
            "/api/career-compass-manual/structured",
            post(compass::handle_manual_structured),
        )
        .route(
            "/api/career-compass-manual/validate",
            post(compass::handle_validate_manual_details),
        )
        // Chat
        .route("/api/chat", post(chat::handle_chat))
        .route(
            "/api/chats",
            get(chat::handle_list_chats).delete(chat::handle_clear_chats),
        )
        .route(
            "/api/chats/:id",
            get(chat::handle_get_chat).delete(chat::handle_delete_chat),
        )
        // Accounts
        .route("/api/auth/register", post(auth::handle_register))
        .route("/api/auth/verify", get(auth::handle_verify))
        .route(
            "/api/auth/resend-verification",
            post(auth::handle_resend_verification),
        )
        .route(
            "/api/auth/check-verification",
            post(auth::handle_check_verification),
        )
        .route("/api/auth/login", post(auth::handle_login))
        .route(
            "/api/auth/forgot-password",
            post(auth::handle_forgot_password),
        )
        .route(
            "/api/auth/reset-password",
            post(auth::handle_reset_password),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
