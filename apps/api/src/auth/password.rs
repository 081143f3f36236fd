//! bcrypt hashing, run off the async executor.

use anyhow::Context;

use crate::errors::AppError;

pub const BCRYPT_COST: u32 = 10;

pub async fn hash_password(password: String) -> Result<String, AppError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .context("Password hashing task failed")?
        .context("Failed to hash password")?;
    Ok(hash)
}

/// An unreadable stored hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .context("Password verification task failed")?;
    Ok(matches)
}
