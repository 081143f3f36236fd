//! Streamed-response plumbing shared by the compass and chat routes.

pub mod data_stream;
pub mod enrichment;
pub mod relay;
pub mod smooth;

pub use data_stream::{data_stream_response, Annotation, StreamPart};
pub use enrichment::{relay_with_enrichment, Completion, Enrichment, OnFinish};
pub use relay::{text_stream_response, with_deadline};
pub use smooth::{smooth, ChunkMode, SmoothOptions};
