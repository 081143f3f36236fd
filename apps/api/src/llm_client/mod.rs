//! LLM client: the single point of entry for all model calls in Compass.
//!
//! ARCHITECTURAL RULE: No other module may call a generation provider directly.
//! Handlers resolve a model through `ModelRegistry` and talk to `ResolvedModel`.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod gemini;
pub mod prompts;
pub mod registry;

pub use registry::{ModelId, ModelRegistry, Provider, ResolvedModel};

/// Ordered text fragments as the provider produces them. Arrival order is the only ordering.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Prompt blocked by provider: {0}")]
    Blocked(String),

    #[error("Request exceeded its time limit")]
    Timeout,

    #[error("LLM returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    /// Opaque binary attachment (PDF, image) passed through to the provider.
    File { data: Bytes, mime_type: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }
}

/// Sampling overrides. `None` keeps the provider's default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sampling {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
}

/// A provider-neutral generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prompt {
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub sampling: Sampling,
}

impl Prompt {
    /// Single user message consisting of one text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            system: None,
            messages: vec![Message::user_text(text)],
            sampling: Sampling::default(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }
}

/// What the provider is asked to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

/// Output mode for structured-object streams. Only schema-less JSON is supported;
/// validation, if any, happens downstream of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectOutput {
    NoSchema,
}

// ────────────────────────────────────────────────────────────────────────────
// Provider seam
// ────────────────────────────────────────────────────────────────────────────

/// A generation backend. One implementation per supported provider.
///
/// Carried in `ModelRegistry` as `Arc<dyn LanguageModel>`.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Issues a streamed generation. The returned stream owns the upstream connection;
    /// dropping it releases the connection.
    async fn stream(
        &self,
        model: &str,
        prompt: &Prompt,
        format: ResponseFormat,
    ) -> Result<TextStream, LlmError>;

    /// Issues a single non-streamed generation and returns the full text.
    async fn generate(
        &self,
        model: &str,
        prompt: &Prompt,
        format: ResponseFormat,
    ) -> Result<String, LlmError>;
}

impl ResolvedModel {
    pub async fn stream_text(&self, prompt: &Prompt) -> Result<TextStream, LlmError> {
        self.backend()
            .stream(self.id().name(), prompt, ResponseFormat::Text)
            .await
    }

    /// Streams the serialization of a single JSON value. Consumers parse the
    /// concatenated stream only after it ends.
    pub async fn stream_structured_object(
        &self,
        prompt: &Prompt,
        output: ObjectOutput,
    ) -> Result<TextStream, LlmError> {
        match output {
            ObjectOutput::NoSchema => {
                self.backend()
                    .stream(self.id().name(), prompt, ResponseFormat::Json)
                    .await
            }
        }
    }

    pub async fn generate_text(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let text = self
            .backend()
            .generate(self.id().name(), prompt, ResponseFormat::Text)
            .await?;
        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text)
    }

    /// Generates in JSON mode and deserializes the result.
    pub async fn generate_object<T: DeserializeOwned>(&self, prompt: &Prompt) -> Result<T, LlmError> {
        let text = self
            .backend()
            .generate(self.id().name(), prompt, ResponseFormat::Json)
            .await?;
        let text = strip_json_fences(&text);
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        serde_json::from_str(text).map_err(LlmError::Parse)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
