//! Axum route handlers for accounts, email verification and password reset.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use chrono::Utc;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::tokens::{consume_token, issue_token, TokenCheck, TokenKind};
use crate::auth::validation::{normalize_email, validate_password, validate_registration};
use crate::errors::AppError;
use crate::mail::templates::{password_reset_email, verification_email};
use crate::models::user::{PublicUser, UserRow};
use crate::state::AppState;

pub const EMAIL_NOT_VERIFIED: &str = "EMAIL_NOT_VERIFIED";
pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub token: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub success: bool,
    pub message: String,
    pub email_delivered: bool,
    /// Only present when the email could not be delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub token: Option<String>,
    pub password: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Missing or blank strings are treated the same.
fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, AppError> {
    Ok(
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?,
    )
}

/// Only verified accounts can request a password reset.
pub fn reset_eligibility(user: Option<UserRow>) -> Result<UserRow, AppError> {
    let user = user.ok_or_else(|| {
        AppError::NotFound(
            "Email not found. Please check your email or sign up for an account.".to_string(),
        )
    })?;
    if !user.is_verified() {
        return Err(AppError::Validation(
            "Please verify your email first. Check your inbox for a verification link or request a new one."
                .to_string(),
        ));
    }
    Ok(user)
}

fn link(base: &str, path: &str, token: &str, email: &str) -> Result<String, AppError> {
    let url = Url::parse_with_params(
        &format!("{base}{path}"),
        &[("token", token), ("email", email)],
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid APP_BASE_URL: {e}")))?;
    Ok(url.into())
}

pub fn verification_link(base: &str, token: &str, email: &str) -> Result<String, AppError> {
    link(base, "/api/auth/verify", token, email)
}

pub fn reset_link(base: &str, token: &str, email: &str) -> Result<String, AppError> {
    link(base, "/reset-password", token, email)
}

fn display_name(user: &UserRow) -> &str {
    user.name.as_deref().unwrap_or("User")
}

async fn send_verification(state: &AppState, user: &UserRow) -> Result<(), AppError> {
    let token = issue_token(&state.db, TokenKind::Verification, &user.email).await?;
    let url = verification_link(&state.config.app_base_url, &token.token, &user.email)?;
    state
        .mailer
        .send(verification_email(&user.email, display_name(user), &url))
        .await?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    validate_registration(
        &request.name,
        &request.email,
        &request.password,
        &request.confirm_password,
    )?;
    let email = normalize_email(&request.email);

    if find_user_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Validation(
            "A user with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(request.password).await?;
    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (id, name, email, password_hash)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(request.name.trim())
    .bind(&email)
    .bind(&password_hash)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::Validation("A user with this email already exists".to_string()))?;

    info!("Registered user {}", user.id);
    send_verification(&state, &user).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Account created. Check your inbox to verify your email.".to_string(),
            user: PublicUser::from(&user),
        }),
    ))
}

/// GET /api/auth/verify?token=..&email=..
///
/// Always answers with a redirect back to the dashboard carrying the outcome.
pub async fn handle_verify(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Result<Redirect, AppError> {
    let base = &state.config.app_base_url;
    let (Some(token), Some(email)) = (
        params.token.filter(|t| !t.is_empty()),
        params.email.filter(|e| !e.is_empty()),
    ) else {
        return Ok(Redirect::to(&format!("{base}/?error=missing_verification_params")));
    };
    let email = normalize_email(&email);

    let mut tx = state.db.begin().await?;
    let check = consume_token(&mut *tx, TokenKind::Verification, &email, &token).await?;
    if check != TokenCheck::Valid {
        tx.commit().await?;
        return Ok(Redirect::to(&format!("{base}/?error={}", check.reason())));
    }

    let updated = sqlx::query("UPDATE users SET email_verified = $2 WHERE email = $1")
        .bind(&email)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    if updated.rows_affected() == 0 {
        return Ok(Redirect::to(&format!("{base}/?error=user_not_found")));
    }

    info!("Verified email for {email}");
    Ok(Redirect::to(&format!("{base}/?success=email_verified")))
}

/// POST /api/auth/resend-verification
pub async fn handle_resend_verification(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<Value>, AppError> {
    let email = normalize_email(&required(request.email, "Email is required")?);
    let user = find_user_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    if user.is_verified() {
        return Err(AppError::Validation("Email is already verified".to_string()));
    }

    send_verification(&state, &user).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Verification email sent"
    })))
}

/// POST /api/auth/check-verification
///
/// Unknown and unverified accounts are reported in a 200 body so the login form can
/// branch on them.
pub async fn handle_check_verification(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<Value>, AppError> {
    let email = normalize_email(&required(request.email, "Email is required")?);
    let body = match find_user_by_email(&state.db, &email).await? {
        None => json!({ "error": USER_NOT_FOUND }),
        Some(user) if !user.is_verified() => json!({ "error": EMAIL_NOT_VERIFIED }),
        Some(_) => json!({ "verified": true }),
    };
    Ok(Json(body))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = normalize_email(&required(request.email, "Email is required")?);
    let password = required(request.password, "Password is required")?;

    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());
    let user = find_user_by_email(&state.db, &email).await?.ok_or_else(invalid)?;
    let hash = user.password_hash.clone().ok_or_else(invalid)?;
    if !verify_password(password, hash).await? {
        return Err(invalid());
    }
    if !user.is_verified() {
        return Err(AppError::Unauthorized(EMAIL_NOT_VERIFIED.to_string()));
    }

    let token = state.sessions.issue(user.id, Utc::now())?;
    Ok(Json(LoginResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

/// POST /api/auth/forgot-password
///
/// A failed email does not fail the request: the token is returned instead so the
/// reset can still be completed.
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<ForgotPasswordResponse>, AppError> {
    let email = normalize_email(&required(request.email, "Email is required")?);
    let user = reset_eligibility(find_user_by_email(&state.db, &email).await?)?;

    let token = issue_token(&state.db, TokenKind::PasswordReset, &user.email).await?;
    let url = reset_link(&state.config.app_base_url, &token.token, &user.email)?;

    let delivery = state
        .mailer
        .send(password_reset_email(&user.email, display_name(&user), &url))
        .await;

    Ok(Json(match delivery {
        Ok(()) => ForgotPasswordResponse {
            success: true,
            message: "Password reset link has been sent to your email.".to_string(),
            email_delivered: true,
            reset_token: None,
        },
        Err(e) => {
            warn!("Password reset email to {} failed: {e}", user.email);
            ForgotPasswordResponse {
                success: true,
                message: "We couldn't send the reset email. Use the reset token to continue."
                    .to_string(),
                email_delivered: false,
                reset_token: Some(token.token),
            }
        }
    }))
}

/// POST /api/auth/reset-password
pub async fn handle_reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let missing = "Email, token, and password are required";
    let email = normalize_email(&required(request.email, missing)?);
    let token = required(request.token, missing)?;
    let password = required(request.password, missing)?;
    validate_password(&password)?;

    let password_hash = hash_password(password).await?;
    let invalid = || AppError::Validation("Invalid or expired reset token".to_string());

    // Token deletion and password update commit together or not at all.
    let mut tx = state.db.begin().await?;
    if consume_token(&mut *tx, TokenKind::PasswordReset, &email, &token).await? != TokenCheck::Valid {
        return Err(invalid());
    }
    let updated = sqlx::query("UPDATE users SET password_hash = $2 WHERE email = $1")
        .bind(&email)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(invalid());
    }
    sqlx::query("DELETE FROM password_reset_tokens WHERE identifier = $1")
        .bind(&email)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!("Password reset for {email}");
    Ok(Json(json!({
        "success": true,
        "message": "Password reset successfully. You can now log in with your new password."
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(verified: bool) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
            password_hash: None,
            email_verified: verified.then(Utc::now),
            image: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_reset_eligibility() {
        assert!(matches!(reset_eligibility(None), Err(AppError::NotFound(_))));
        assert!(matches!(
            reset_eligibility(Some(user(false))),
            Err(AppError::Validation(_))
        ));
        assert!(reset_eligibility(Some(user(true))).is_ok());
    }

    #[test]
    fn test_links_encode_email() {
        let url = reset_link("http://localhost:3000", "abc123", "ada+jobs@example.com").unwrap();
        assert_eq!(
            url,
            "http://localhost:3000/reset-password?token=abc123&email=ada%2Bjobs%40example.com"
        );

        let url = verification_link("https://compass.example.com", "t", "ada@example.com").unwrap();
        assert!(url.starts_with("https://compass.example.com/api/auth/verify?token=t&email="));
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(required(None, "x").is_err());
        assert!(required(Some("  ".to_string()), "x").is_err());
        assert_eq!(required(Some("v".to_string()), "x").unwrap(), "v");
    }

    #[test]
    fn test_forgot_password_response_hides_token_on_delivery() {
        let delivered = serde_json::to_value(ForgotPasswordResponse {
            success: true,
            message: String::new(),
            email_delivered: true,
            reset_token: None,
        })
        .unwrap();
        assert_eq!(delivered["emailDelivered"], true);
        assert!(delivered.get("resetToken").is_none());
    }
}
