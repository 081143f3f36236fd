//! Provider registry: maps `<provider>:<name>` model identifiers onto backends.
//!
//! Only providers registered at startup are served. Anything else (unknown provider,
//! unregistered provider, malformed identifier) resolves to the default model. This is a
//! fallback policy, not an error path.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use super::LanguageModel;

/// Default model for analysis, chat and related-question generation.
pub const DEFAULT_MODEL: &str = "google:gemini-2.0-flash";
/// Cheaper model for validation and structured-to-markdown conversion.
pub const LITE_MODEL: &str = "google:gemini-2.0-flash-lite";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Google,
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }
}

impl FromStr for Provider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Provider::Google),
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            _ => Err(()),
        }
    }
}

/// A provider-qualified model identifier, e.g. `google:gemini-2.0-flash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelId {
    provider: Provider,
    name: String,
}

impl ModelId {
    /// Parses `<provider>:<name>`. The name may itself contain `:`.
    pub fn parse(id: &str) -> Option<Self> {
        let (provider, name) = id.split_once(':')?;
        let provider = provider.parse::<Provider>().ok()?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            provider,
            name: name.to_string(),
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider.as_str(), self.name)
    }
}

/// A model identifier bound to the backend that serves it.
#[derive(Clone)]
pub struct ResolvedModel {
    backend: Arc<dyn LanguageModel>,
    id: ModelId,
}

impl ResolvedModel {
    pub fn id(&self) -> &ModelId {
        &self.id
    }

    pub fn backend(&self) -> &dyn LanguageModel {
        self.backend.as_ref()
    }
}

/// Lookup table of provider backends, built once at startup.
#[derive(Clone)]
pub struct ModelRegistry {
    backends: HashMap<Provider, Arc<dyn LanguageModel>>,
    default: ModelId,
    default_backend: Arc<dyn LanguageModel>,
}

impl ModelRegistry {
    /// Creates a registry whose default model is served by `backend`.
    pub fn new(default: ModelId, backend: Arc<dyn LanguageModel>) -> Self {
        let mut backends = HashMap::new();
        backends.insert(default.provider(), Arc::clone(&backend));
        Self {
            backends,
            default,
            default_backend: backend,
        }
    }

    pub fn register(mut self, provider: Provider, backend: Arc<dyn LanguageModel>) -> Self {
        self.backends.insert(provider, backend);
        self
    }

    pub fn default_model(&self) -> &ModelId {
        &self.default
    }

    /// Resolves a requested identifier, substituting the default model when the
    /// provider is not served.
    pub fn resolve(&self, requested: &str) -> ResolvedModel {
        if let Some(id) = ModelId::parse(requested) {
            if let Some(backend) = self.backends.get(&id.provider()) {
                return ResolvedModel {
                    backend: Arc::clone(backend),
                    id,
                };
            }
        }

        debug!(
            "Model '{}' is not served; falling back to {}",
            requested, self.default
        );
        self.resolve_default()
    }

    pub fn resolve_default(&self) -> ResolvedModel {
        ResolvedModel {
            backend: Arc::clone(&self.default_backend),
            id: self.default.clone(),
        }
    }
}
