//! Follow-up question suggestions, generated after the assistant finishes answering.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::prompts::RELATED_QUESTIONS;
use crate::llm_client::{LlmError, Prompt, ResolvedModel};
use crate::streaming::{Annotation, Enrichment};

pub const QUESTION_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedQuery {
    pub query: String,
}

#[derive(Debug, Deserialize)]
struct Related {
    items: Vec<RelatedQuery>,
}

pub struct RelatedQuestions {
    model: ResolvedModel,
}

impl RelatedQuestions {
    pub fn new(model: ResolvedModel) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Enrichment for RelatedQuestions {
    fn pending(&self) -> Annotation {
        Annotation::related_questions(json!([]))
    }

    /// Sees only the latest message, the assistant's reply, sent as if the user wrote it.
    async fn enrich(&self, completed_text: &str) -> Result<Annotation, LlmError> {
        let prompt = Prompt::text(completed_text).with_system(RELATED_QUESTIONS);
        let related: Related = self.model.generate_object(&prompt).await?;

        let items: Vec<RelatedQuery> = related
            .items
            .into_iter()
            .filter(|q| !q.query.trim().is_empty())
            .take(QUESTION_COUNT)
            .collect();
        if items.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        debug!("Generated {} related questions with {}", items.len(), self.model.id());
        Ok(Annotation::related_questions(serde_json::to_value(items)?))
    }
}
