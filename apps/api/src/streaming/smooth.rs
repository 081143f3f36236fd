//! Re-chunks a text stream into word- or line-sized pieces with a pause between them.
//!
//! Content is only ever regrouped: concatenating the output yields exactly the input.

use std::time::Duration;

use futures::StreamExt;

use crate::llm_client::TextStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkMode {
    /// Emit up to and including the whitespace that follows a word.
    Word,
    /// Emit up to and including a run of newlines.
    Line,
}

#[derive(Debug, Clone, Copy)]
pub struct SmoothOptions {
    pub delay: Duration,
    pub mode: ChunkMode,
}

impl SmoothOptions {
    pub fn words(delay: Duration) -> Self {
        Self {
            delay,
            mode: ChunkMode::Word,
        }
    }
}

pub fn smooth(upstream: TextStream, options: SmoothOptions) -> TextStream {
    Box::pin(async_stream::stream! {
        let mut upstream = upstream;
        let mut buffer = String::new();

        while let Some(item) = upstream.next().await {
            match item {
                Ok(text) => {
                    buffer.push_str(&text);
                    while let Some(end) = next_chunk_end(&buffer, options.mode) {
                        let chunk: String = buffer.drain(..end).collect();
                        yield Ok(chunk);
                        if !options.delay.is_zero() {
                            tokio::time::sleep(options.delay).await;
                        }
                    }
                }
                Err(e) => {
                    if !buffer.is_empty() {
                        yield Ok(std::mem::take(&mut buffer));
                    }
                    yield Err(e);
                    return;
                }
            }
        }

        if !buffer.is_empty() {
            yield Ok(buffer);
        }
    })
}

/// Byte offset just past the first complete chunk in `buffer`, if there is one.
fn next_chunk_end(buffer: &str, mode: ChunkMode) -> Option<usize> {
    match mode {
        ChunkMode::Word => {
            let mut chars = buffer.char_indices().peekable();

            while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

            let mut saw_word = false;
            while chars.next_if(|(_, c)| !c.is_whitespace()).is_some() {
                saw_word = true;
            }
            if !saw_word {
                return None;
            }

            let mut end = None;
            while let Some((i, c)) = chars.next_if(|(_, c)| c.is_whitespace()) {
                end = Some(i + c.len_utf8());
            }
            end
        }
        ChunkMode::Line => {
            let start = buffer.find('\n')?;
            let run = buffer[start..].bytes().take_while(|b| *b == b'\n').count();
            Some(start + run)
        }
    }
}
