//! Axum route handlers for the Career Compass analysis, validation and saved reports.

use axum::{
    extract::{Multipart, State},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{info, warn};

use super::prompts::{
    CAREER_COMPASS, MANUAL_DETAILS_VALIDATION, MANUAL_STRUCTURED, RESUME_VALIDATION,
    STRUCTURED_COMPASS, STRUCTURED_DATA_HEADING, STRUCTURED_TO_MARKDOWN,
};
use super::report::{load_report, save_report};
use super::request::{GenerationRequest, PromptTemplate, Upload, UploadedFile};
use super::schema::ManualAnalysis;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::registry::LITE_MODEL;
use crate::llm_client::{LlmError, ObjectOutput, Prompt};
use crate::models::report::ReportRow;
use crate::state::AppState;
use crate::streaming::{smooth, text_stream_response, with_deadline, SmoothOptions};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReportRequest {
    pub structured_data: Option<Value>,
    pub markdown_report: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveReportResponse {
    pub success: bool,
    pub report: ReportRow,
}

#[derive(Debug, Serialize)]
pub struct LoadReportResponse {
    pub report: Option<ReportRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDataRequest {
    pub structured_data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ManualDetailsRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub is_valid: bool,
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Collects the `file` and `text` fields; anything else is ignored.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut upload = Upload::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                upload.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            "text" => upload.text = Some(field.text().await?),
            _ => {}
        }
    }
    Ok(upload)
}

async fn prompt_from_upload(
    template: &'static PromptTemplate,
    multipart: Multipart,
) -> Result<Prompt, AppError> {
    let upload = read_upload(multipart).await?;
    Ok(GenerationRequest::from_upload(template, upload)?.into_prompt())
}

fn deadline(state: &AppState) -> Instant {
    Instant::now() + state.config.request_timeout
}

/// The model answers YES or NO.
pub fn is_resume_answer(answer: &str) -> bool {
    answer.to_lowercase().contains("yes")
}

/// The model answers VALID or INVALID: reason.
pub fn is_valid_details_answer(answer: &str) -> bool {
    let answer = answer.to_lowercase();
    answer.contains("valid") && !answer.contains("invalid")
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/career-compass
///
/// Markdown career analysis of an uploaded PDF or pasted resume text, streamed word by word.
pub async fn handle_career_compass(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let prompt = prompt_from_upload(&CAREER_COMPASS, multipart).await?;
    let model = state.models.resolve_default();

    info!("Career compass analysis with {}", model.id());
    let stream = model.stream_text(&prompt).await?;
    let stream = smooth(
        with_deadline(stream, deadline(&state)),
        SmoothOptions::words(state.config.smooth_delay),
    );
    Ok(text_stream_response(stream))
}

/// POST /api/career-compass/structured
///
/// Streams one JSON object; the client parses it after the stream ends.
pub async fn handle_structured_compass(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let prompt = prompt_from_upload(&STRUCTURED_COMPASS, multipart)
        .await?
        .with_system(JSON_ONLY_SYSTEM);
    let model = state.models.resolve_default();

    info!("Structured career compass analysis with {}", model.id());
    let stream = model
        .stream_structured_object(&prompt, ObjectOutput::NoSchema)
        .await?;
    Ok(text_stream_response(with_deadline(stream, deadline(&state))))
}

/// POST /api/career-compass/validate-resume
pub async fn handle_validate_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ValidationResponse>, AppError> {
    let prompt = prompt_from_upload(&RESUME_VALIDATION, multipart).await?;
    let answer = state.models.resolve(LITE_MODEL).generate_text(&prompt).await?;
    let message = answer.trim().to_string();

    Ok(Json(ValidationResponse {
        is_valid: is_resume_answer(&message),
        message,
    }))
}

/// POST /api/career-compass/save-report
pub async fn handle_save_report(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SaveReportRequest>,
) -> Result<Json<SaveReportResponse>, AppError> {
    let (Some(structured_data), Some(markdown_report)) = (
        request.structured_data.filter(|v| !v.is_null()),
        request.markdown_report.filter(|m| !m.trim().is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Both structured data and markdown report are required".to_string(),
        ));
    };

    let report = save_report(&state.db, user.user_id, &structured_data, &markdown_report).await?;
    Ok(Json(SaveReportResponse {
        success: true,
        report,
    }))
}

/// GET /api/career-compass/load
pub async fn handle_load_report(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<LoadReportResponse>, AppError> {
    let report = load_report(&state.db, user.user_id).await?;
    Ok(Json(LoadReportResponse { report }))
}

/// POST /api/career-compass-manual
///
/// Formats previously generated structured recommendations as a markdown report.
pub async fn handle_manual_markdown(
    State(state): State<AppState>,
    Json(request): Json<StructuredDataRequest>,
) -> Result<Response, AppError> {
    let structured = request
        .structured_data
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::Validation("No structured data provided".to_string()))?;

    let prompt = Prompt::text(format!(
        "{STRUCTURED_TO_MARKDOWN}\n\n{STRUCTURED_DATA_HEADING}\n{}",
        serde_json::to_string_pretty(&structured).map_err(LlmError::Parse)?
    ));
    let model = state.models.resolve(LITE_MODEL);

    let stream = model.stream_text(&prompt).await?;
    let stream = smooth(
        with_deadline(stream, deadline(&state)),
        SmoothOptions::words(state.config.smooth_delay),
    );
    Ok(text_stream_response(stream))
}

/// POST /api/career-compass-manual/structured
///
/// Non-streamed: the generated object is checked against the recommendation rules before
/// it is returned.
pub async fn handle_manual_structured(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ManualAnalysis>, AppError> {
    let prompt = prompt_from_upload(&MANUAL_STRUCTURED, multipart)
        .await?
        .with_system(JSON_ONLY_SYSTEM);
    let model = state.models.resolve_default();

    let analysis: ManualAnalysis = match model.generate_object(&prompt).await {
        Ok(analysis) => analysis,
        Err(LlmError::Parse(e)) => {
            warn!("Manual analysis did not match the recommendation shape: {e}");
            return Err(AppError::UnprocessableEntity(
                "Generated analysis did not match the expected format".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    if let Err(violation) = analysis.validate() {
        warn!("Manual analysis rejected: {violation}");
        return Err(AppError::UnprocessableEntity(violation.to_string()));
    }

    info!(
        "Manual analysis produced {} recommendations",
        analysis.job_recommendations.len()
    );
    Ok(Json(analysis))
}

/// POST /api/career-compass-manual/validate
pub async fn handle_validate_manual_details(
    State(state): State<AppState>,
    Json(request): Json<ManualDetailsRequest>,
) -> Result<Json<ValidationResponse>, AppError> {
    let text = request
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("No content provided for validation".to_string()))?;

    let prompt = Prompt::text(format!("{MANUAL_DETAILS_VALIDATION}\n{text}"));
    let answer = state.models.resolve(LITE_MODEL).generate_text(&prompt).await?;
    let message = answer.trim().to_string();

    Ok(Json(ValidationResponse {
        is_valid: is_valid_details_answer(&message),
        message,
    }))
}
