//! One saved Career Compass report per user.

use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::report::ReportRow;

/// Creates the user's report or replaces both halves of it in one statement.
pub async fn save_report(
    pool: &PgPool,
    user_id: Uuid,
    structured_data: &Value,
    markdown_report: &str,
) -> Result<ReportRow, AppError> {
    let saved = sqlx::query_as::<_, ReportRow>(
        r#"
        INSERT INTO career_compass_reports (user_id, structured_data, markdown_report)
        SELECT id, $2, $3 FROM users WHERE id = $1
        ON CONFLICT (user_id) DO UPDATE
            SET structured_data = EXCLUDED.structured_data,
                markdown_report = EXCLUDED.markdown_report,
                updated_at = now()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(structured_data)
    .bind(markdown_report)
    .fetch_optional(pool)
    .await?;

    let report = saved.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    info!("Saved career compass report for user {user_id}");
    Ok(report)
}

/// `Ok(None)` when the user exists but has not saved a report yet.
pub async fn load_report(pool: &PgPool, user_id: Uuid) -> Result<Option<ReportRow>, AppError> {
    let user_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if !user_exists {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(sqlx::query_as::<_, ReportRow>(
        "SELECT * FROM career_compass_reports WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}
