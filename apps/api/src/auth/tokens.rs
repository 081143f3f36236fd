//! Single-use, expiring tokens for email verification and password reset.
//!
//! Issuing a token deletes any earlier token for the same identifier. Consuming a token
//! deletes it in the same statement that reads it, so a token can succeed at most once.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sqlx::{PgExecutor, PgPool};

use crate::models::token::TokenRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Verification,
    PasswordReset,
}

impl TokenKind {
    fn table(&self) -> &'static str {
        match self {
            TokenKind::Verification => "verification_tokens",
            TokenKind::PasswordReset => "password_reset_tokens",
        }
    }

    pub fn ttl(&self) -> Duration {
        match self {
            TokenKind::Verification => Duration::hours(24),
            TokenKind::PasswordReset => Duration::hours(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    Valid,
    Expired,
    Unknown,
}

impl TokenCheck {
    /// Short reason code, used in redirect query strings.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenCheck::Valid => "valid",
            TokenCheck::Expired => "token_expired",
            TokenCheck::Unknown => "invalid_token",
        }
    }
}

pub fn check_token(row: Option<&TokenRow>, now: DateTime<Utc>) -> TokenCheck {
    match row {
        None => TokenCheck::Unknown,
        Some(row) if row.is_expired(now) => TokenCheck::Expired,
        Some(_) => TokenCheck::Valid,
    }
}

/// 32 random bytes, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub async fn issue_token(
    pool: &PgPool,
    kind: TokenKind,
    identifier: &str,
) -> Result<TokenRow, sqlx::Error> {
    let row = TokenRow {
        identifier: identifier.to_string(),
        token: generate_token(),
        expires: Utc::now() + kind.ttl(),
    };

    let mut tx = pool.begin().await?;
    sqlx::query(&format!("DELETE FROM {} WHERE identifier = $1", kind.table()))
        .bind(identifier)
        .execute(&mut *tx)
        .await?;
    sqlx::query(&format!(
        "INSERT INTO {} (identifier, token, expires) VALUES ($1, $2, $3)",
        kind.table()
    ))
    .bind(&row.identifier)
    .bind(&row.token)
    .bind(row.expires)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(row)
}

/// Deletes the token and reports whether it was usable.
pub async fn consume_token<'e, E: PgExecutor<'e>>(
    executor: E,
    kind: TokenKind,
    identifier: &str,
    token: &str,
) -> Result<TokenCheck, sqlx::Error> {
    let row = sqlx::query_as::<_, TokenRow>(&format!(
        "DELETE FROM {} WHERE identifier = $1 AND token = $2 RETURNING *",
        kind.table()
    ))
    .bind(identifier)
    .bind(token)
    .fetch_optional(executor)
    .await?;

    Ok(check_token(row.as_ref(), Utc::now()))
}
