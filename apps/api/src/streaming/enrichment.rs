//! Primary stream followed by a secondary generation on the annotation channel.
//!
//! Output order on success:
//!   text parts → pending annotation → final annotation → finish
//!
//! The secondary call starts only after the primary stream has ended. One deadline bounds
//! the primary stream, the secondary call and the finish hook together.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::{Stream, StreamExt};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, warn};

use super::data_stream::{Annotation, StreamPart};
use super::relay::with_deadline;
use super::smooth::{smooth, SmoothOptions};
use crate::llm_client::{LlmError, TextStream};

const PRIMARY_FAILED: &str = "An error occurred while generating the response";
const ENRICHMENT_FAILED: &str = "An error occurred while generating follow-up content";
const DEADLINE_EXCEEDED: &str = "The request exceeded its time limit";

/// A secondary generation run over the completed primary text.
#[async_trait]
pub trait Enrichment: Send + Sync {
    /// Placeholder annotation sent before the secondary call starts.
    fn pending(&self) -> Annotation;

    async fn enrich(&self, completed_text: &str) -> Result<Annotation, LlmError>;
}

/// Everything the client received, handed to `on_finish`.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub annotations: Vec<Annotation>,
}

pub type OnFinish = Box<dyn FnOnce(Completion) -> BoxFuture<'static, ()> + Send>;

pub fn relay_with_enrichment(
    primary: TextStream,
    smoothing: Option<SmoothOptions>,
    enrichment: Arc<dyn Enrichment>,
    on_finish: Option<OnFinish>,
    deadline: Instant,
) -> impl Stream<Item = StreamPart> + Send + 'static {
    async_stream::stream! {
        let primary = with_deadline(primary, deadline);
        let mut primary = match smoothing {
            Some(options) => smooth(primary, options),
            None => primary,
        };

        let mut text = String::new();
        while let Some(chunk) = primary.next().await {
            match chunk {
                Ok(chunk) => {
                    text.push_str(&chunk);
                    yield StreamPart::Text(chunk);
                }
                Err(e) => {
                    error!("Primary stream failed: {e}");
                    yield StreamPart::Error(PRIMARY_FAILED.to_string());
                    return;
                }
            }
        }
        drop(primary);

        yield StreamPart::Annotation(enrichment.pending());

        let annotation = match timeout_at(deadline, enrichment.enrich(&text)).await {
            Ok(Ok(annotation)) => annotation,
            Ok(Err(e)) => {
                error!("Enrichment failed: {e}");
                yield StreamPart::Error(ENRICHMENT_FAILED.to_string());
                return;
            }
            Err(_) => {
                warn!("Enrichment exceeded the request deadline");
                yield StreamPart::Error(DEADLINE_EXCEEDED.to_string());
                return;
            }
        };
        yield StreamPart::Annotation(annotation.clone());

        if let Some(on_finish) = on_finish {
            debug!("Running finish hook ({} chars)", text.len());
            let completion = Completion {
                text,
                annotations: vec![annotation],
            };
            if timeout_at(deadline, on_finish(completion)).await.is_err() {
                warn!("Finish hook exceeded the request deadline");
                yield StreamPart::Error(DEADLINE_EXCEEDED.to_string());
                return;
            }
        }

        yield StreamPart::Finish;
    }
}
