//! Line-framed data stream used by chat: text and annotations travel on separate channels.
//!
//! Every part is one line, `<code>:<json>\n`:
//! - `0:` text fragment (JSON string)
//! - `8:` message annotations (JSON array)
//! - `3:` error message (JSON string)
//! - `d:` finish message (JSON object)

use axum::{
    body::Body,
    http::HeaderName,
    response::{IntoResponse, Response},
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::relay::STREAM_HEADERS;

pub const RELATED_QUESTIONS: &str = "related-questions";

/// Out-of-band payload attached to an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
}

impl Annotation {
    pub fn related_questions(items: Value) -> Self {
        Self {
            kind: RELATED_QUESTIONS.to_string(),
            data: json!({ "items": items }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamPart {
    Text(String),
    Annotation(Annotation),
    Error(String),
    Finish,
}

impl StreamPart {
    pub fn encode(&self) -> String {
        match self {
            StreamPart::Text(text) => format!("0:{}\n", Value::from(text.as_str())),
            StreamPart::Annotation(annotation) => format!("8:{}\n", json!([annotation])),
            StreamPart::Error(message) => format!("3:{}\n", Value::from(message.as_str())),
            StreamPart::Finish => format!("d:{}\n", json!({ "finishReason": "stop" })),
        }
    }
}

pub fn data_stream_response<S>(parts: S) -> Response
where
    S: Stream<Item = StreamPart> + Send + 'static,
{
    let body = Body::from_stream(parts.map(|part| Ok::<_, std::convert::Infallible>(part.encode())));
    (
        STREAM_HEADERS,
        [(HeaderName::from_static("x-vercel-ai-data-stream"), "v1")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_part_is_json_string_line() {
        let line = StreamPart::Text("He said \"hi\"\n".to_string()).encode();
        assert_eq!(line, "0:\"He said \\\"hi\\\"\\n\"\n");
    }

    #[test]
    fn test_annotation_part_wraps_in_array() {
        let line = StreamPart::Annotation(Annotation::related_questions(json!([]))).encode();
        let payload = line
            .strip_prefix("8:")
            .and_then(|rest| rest.strip_suffix('\n'))
            .unwrap();
        let value: Value = serde_json::from_str(payload).unwrap();
        assert_eq!(
            value,
            json!([{ "type": "related-questions", "data": { "items": [] } }])
        );
    }

    #[test]
    fn test_finish_and_error_parts() {
        assert_eq!(StreamPart::Finish.encode(), "d:{\"finishReason\":\"stop\"}\n");
        assert_eq!(StreamPart::Error("boom".to_string()).encode(), "3:\"boom\"\n");
    }

    #[tokio::test]
    async fn test_response_carries_protocol_header() {
        let response = data_stream_response(futures::stream::iter(vec![StreamPart::Finish]));
        assert_eq!(response.headers()["x-vercel-ai-data-stream"], "v1");
        assert_eq!(response.headers()["content-type"], "text/event-stream");
    }
}
