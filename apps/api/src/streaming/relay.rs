//! Forwards a model stream to the HTTP response as it is produced.
//!
//! The response body owns the upstream stream. When the client disconnects, hyper drops
//! the body, which drops the upstream `reqwest::Response` and closes that connection.

use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use tokio::time::Instant;
use tracing::{error, warn};

use crate::llm_client::{LlmError, TextStream};

pub(crate) const STREAM_HEADERS: [(header::HeaderName, &str); 3] = [
    (header::CONTENT_TYPE, "text/event-stream"),
    (header::CACHE_CONTROL, "no-cache, no-transform"),
    (header::CONNECTION, "keep-alive"),
];

/// Streams plain text: every upstream chunk becomes one body frame.
/// An upstream error aborts the body.
pub fn text_stream_response(stream: TextStream) -> Response {
    let frames = stream.map(|chunk| {
        if let Err(e) = &chunk {
            error!("Upstream stream failed mid-response: {e}");
        }
        chunk
    });

    (STREAM_HEADERS, Body::from_stream(frames)).into_response()
}

/// Ends the stream with `LlmError::Timeout` once `deadline` passes.
pub fn with_deadline(stream: TextStream, deadline: Instant) -> TextStream {
    Box::pin(async_stream::stream! {
        let mut stream = stream;
        loop {
            match tokio::time::timeout_at(deadline, stream.next()).await {
                Ok(Some(item)) => {
                    let failed = item.is_err();
                    yield item;
                    if failed {
                        return;
                    }
                }
                Ok(None) => return,
                Err(_) => {
                    warn!("Stream exceeded its deadline; closing");
                    yield Err(LlmError::Timeout);
                    return;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::StatusCode;
    use http_body_util::BodyExt;

    fn ok_chunks(chunks: &[&str]) -> TextStream {
        let items: Vec<Result<String, LlmError>> =
            chunks.iter().map(|c| Ok(c.to_string())).collect();
        Box::pin(futures::stream::iter(items))
    }

    #[tokio::test]
    async fn test_relay_sets_streaming_headers() {
        let response = text_stream_response(ok_chunks(&["a"]));
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache, no-transform");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
    }

    #[tokio::test]
    async fn test_relay_writes_one_frame_per_chunk() {
        let chunks = ["# Candidate", " Profile", "\n", "- Rust"];
        let mut body = text_stream_response(ok_chunks(&chunks)).into_body();

        let mut frames = Vec::new();
        while let Some(frame) = body.frame().await {
            let frame = frame.unwrap();
            if let Ok(data) = frame.into_data() {
                frames.push(String::from_utf8(data.to_vec()).unwrap());
            }
        }

        assert_eq!(frames, chunks);
    }

    #[tokio::test]
    async fn test_relay_aborts_body_on_upstream_error() {
        let items: Vec<Result<String, LlmError>> = vec![
            Ok("partial".to_string()),
            Err(LlmError::Stream("connection reset".to_string())),
        ];
        let body = text_stream_response(Box::pin(futures::stream::iter(items))).into_body();
        assert!(body.collect().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_cuts_off_slow_stream() {
        let slow: TextStream = Box::pin(async_stream::stream! {
            yield Ok::<_, LlmError>("first".to_string());
            tokio::time::sleep(Duration::from_secs(120)).await;
            yield Ok("too late".to_string());
        });
        let mut stream = with_deadline(slow, Instant::now() + Duration::from_secs(60));

        assert_eq!(stream.next().await.unwrap().unwrap(), "first");
        assert!(matches!(stream.next().await, Some(Err(LlmError::Timeout))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_deadline_passes_fast_stream_through() {
        let stream = with_deadline(
            ok_chunks(&["a", "b", "c"]),
            Instant::now() + Duration::from_secs(60),
        );
        let out: Vec<String> = stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(out, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_dropped_body_releases_upstream() {
        struct Released(Arc<AtomicBool>);

        impl Drop for Released {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let released = Arc::new(AtomicBool::new(false));
        let guard = Released(Arc::clone(&released));
        let upstream: TextStream = Box::pin(async_stream::stream! {
            let _guard = guard;
            yield Ok::<_, LlmError>("first".to_string());
            futures::future::pending::<()>().await;
        });

        let mut body = text_stream_response(upstream).into_body();
        let frame = body.frame().await.unwrap().unwrap();
        assert_eq!(&frame.into_data().unwrap()[..], b"first");
        assert!(!released.load(Ordering::SeqCst));

        drop(body);
        assert!(released.load(Ordering::SeqCst));
    }
}
