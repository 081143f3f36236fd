use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row shape shared by `verification_tokens` and `password_reset_tokens`.
#[derive(Debug, Clone, FromRow)]
pub struct TokenRow {
    pub identifier: String,
    pub token: String,
    pub expires: DateTime<Utc>,
}

impl TokenRow {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }
}
