//! Career chat: streamed answers with follow-up questions, and per-user history.

pub mod handlers;
pub mod models;
pub mod prompts;
pub mod related;
pub mod store;

pub use store::{ChatRepository, RedisChatStore};
