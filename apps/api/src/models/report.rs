use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub structured_data: Value,
    pub markdown_report: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
