//! Gemini backend for the Generative Language REST API.
//!
//! Streaming uses `models/{model}:streamGenerateContent?alt=sse`; every SSE event carries a
//! full `GenerateContentResponse` whose candidate text is the next chunk.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LanguageModel, LlmError, Part, Prompt, ResponseFormat, Role, TextStream};

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Wraps the Gemini REST API. Cheap to clone; shares one connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Result<Self, LlmError> {
        // No total timeout: streams may legitimately run for a long time. The request
        // ceiling is enforced by the relay.
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    async fn send(
        &self,
        url: String,
        prompt: &Prompt,
        format: ResponseFormat,
    ) -> Result<reqwest::Response, LlmError> {
        let body = GenerateContentRequest::from_prompt(prompt, format);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn stream(
        &self,
        model: &str,
        prompt: &Prompt,
        format: ResponseFormat,
    ) -> Result<TextStream, LlmError> {
        let url = format!("{}?alt=sse", self.endpoint(model, "streamGenerateContent"));
        let response = self.send(url, prompt, format).await?;
        debug!("Gemini stream opened for model {model}");

        let chunks = response
            .bytes_stream()
            .eventsource()
            .filter_map(|event| async move {
                match event {
                    Ok(event) => match parse_chunk(&event.data) {
                        Ok(Some(text)) => Some(Ok(text)),
                        Ok(None) => None,
                        Err(e) => Some(Err(e)),
                    },
                    Err(e) => Some(Err(LlmError::Stream(e.to_string()))),
                }
            });

        Ok(Box::pin(chunks))
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &Prompt,
        format: ResponseFormat,
    ) -> Result<String, LlmError> {
        let response = self
            .send(self.endpoint(model, "generateContent"), prompt, format)
            .await?;
        let body: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &body.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        body.into_text()?.ok_or(LlmError::EmptyContent)
    }
}

/// Decodes one SSE payload. Returns `None` for events that carry no text
/// (e.g. a final event with only usage metadata).
fn parse_chunk(data: &str) -> Result<Option<String>, LlmError> {
    let data = data.trim();
    if data.is_empty() {
        return Ok(None);
    }
    let response: GenerateContentResponse = serde_json::from_str(data)?;
    response.into_text()
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a Prompt, format: ResponseFormat) -> Self {
        let contents = prompt
            .messages
            .iter()
            .map(|message| Content {
                role: Some(match message.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                }),
                parts: message.parts.iter().map(WirePart::from).collect(),
            })
            .collect();

        let system_instruction = prompt.system.as_deref().map(|text| Content {
            role: None,
            parts: vec![WirePart::Text { text }],
        });

        let config = GenerationConfig {
            response_mime_type: match format {
                ResponseFormat::Text => None,
                ResponseFormat::Json => Some("application/json"),
            },
            temperature: prompt.sampling.temperature,
            top_p: prompt.sampling.top_p,
            top_k: prompt.sampling.top_k,
        };
        let generation_config = (!config.is_empty()).then_some(config);

        Self {
            contents,
            system_instruction,
            generation_config,
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

impl<'a> From<&'a Part> for WirePart<'a> {
    fn from(part: &'a Part) -> Self {
        match part {
            Part::Text(text) => WirePart::Text { text },
            Part::File { data, mime_type } => WirePart::Inline {
                inline_data: InlineData {
                    mime_type,
                    data: STANDARD.encode(data),
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self.response_mime_type.is_none()
            && self.temperature.is_none()
            && self.top_p.is_none()
            && self.top_k.is_none()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<Option<String>, LlmError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(LlmError::Blocked(reason));
        }

        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{Message, Sampling};
    use bytes::Bytes;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sse_body(chunks: &[&str]) -> String {
        chunks
            .iter()
            .map(|text| {
                let event = json!({
                    "candidates": [{
                        "content": { "role": "model", "parts": [{ "text": text }] }
                    }]
                });
                format!("data: {event}\r\n\r\n")
            })
            .collect()
    }

    async fn collect(mut stream: TextStream) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.push(chunk.unwrap());
        }
        out
    }

    #[test]
    fn test_parse_chunk_concatenates_parts() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"Hello"},{"text":", world"}]}}]}"#;
        assert_eq!(parse_chunk(data).unwrap().as_deref(), Some("Hello, world"));
    }

    #[test]
    fn test_parse_chunk_skips_usage_only_events() {
        let data = r#"{"usageMetadata":{"promptTokenCount":10,"candidatesTokenCount":5}}"#;
        assert_eq!(parse_chunk(data).unwrap(), None);
    }

    #[test]
    fn test_parse_chunk_reports_blocked_prompts() {
        let data = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert!(matches!(parse_chunk(data), Err(LlmError::Blocked(r)) if r == "SAFETY"));
    }

    #[test]
    fn test_document_part_is_sent_inline() {
        let prompt = Prompt {
            system: Some("system text".to_string()),
            messages: vec![Message {
                role: Role::User,
                parts: vec![
                    Part::Text("Analyze this".to_string()),
                    Part::File {
                        data: Bytes::from_static(b"%PDF-1.4"),
                        mime_type: "application/pdf".to_string(),
                    },
                ],
            }],
            sampling: Sampling::default(),
        };
        let body = serde_json::to_value(GenerateContentRequest::from_prompt(
            &prompt,
            ResponseFormat::Json,
        ))
        .unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Analyze this");
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "application/pdf"
        );
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"]["data"],
            STANDARD.encode(b"%PDF-1.4")
        );
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "system text");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_sampling_goes_into_generation_config() {
        let prompt = Prompt::text("hello").with_sampling(Sampling {
            temperature: Some(0.6),
            top_p: Some(1.0),
            top_k: Some(40),
        });
        let body = serde_json::to_value(GenerateContentRequest::from_prompt(
            &prompt,
            ResponseFormat::Text,
        ))
        .unwrap();

        assert_eq!(
            body["generationConfig"],
            json!({ "temperature": 0.6, "topP": 1.0, "topK": 40 })
        );
    }

    #[test]
    fn test_plain_text_request_has_no_generation_config() {
        let body = serde_json::to_value(GenerateContentRequest::from_prompt(
            &Prompt::text("hello"),
            ResponseFormat::Text,
        ))
        .unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn test_stream_yields_chunks_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body(&["# Candidate", " Profile", "\n\n- Rust"])),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key".to_string(), server.uri()).unwrap();
        let stream = client
            .stream("gemini-2.0-flash", &Prompt::text("analyze"), ResponseFormat::Text)
            .await
            .unwrap();

        assert_eq!(
            collect(stream).await,
            vec!["# Candidate", " Profile", "\n\n- Rust"]
        );
    }

    #[tokio::test]
    async fn test_api_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": { "code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key".to_string(), server.uri()).unwrap();
        let result = client
            .generate("gemini-2.0-flash", &Prompt::text("hi"), ResponseFormat::Text)
            .await;

        match result {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "The model is overloaded.");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_requests_json_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "{\"items\":[]}" }] } }],
                "usageMetadata": { "promptTokenCount": 3, "candidatesTokenCount": 4 }
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key".to_string(), server.uri()).unwrap();
        let text = client
            .generate("gemini-2.0-flash", &Prompt::text("hi"), ResponseFormat::Json)
            .await
            .unwrap();
        assert_eq!(text, "{\"items\":[]}");
    }
}
