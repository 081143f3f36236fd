//! Chat history persistence.
//!
//! Redis layout:
//! - `chat:{id}` hash with `id`, `userId`, `title`, `path`, `createdAt` (RFC 3339) and
//!   `messages` (JSON array)
//! - `user:chat:{user_id}` sorted set of chat keys scored by creation time in milliseconds

use std::collections::HashMap;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, warn};
use uuid::Uuid;

use super::models::Chat;
use crate::errors::AppError;

/// Per-user chat storage. Every read and delete is scoped to the owning user; a chat that
/// belongs to someone else behaves as if it did not exist.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Creates or replaces a chat. An existing chat keeps its creation time.
    async fn save(&self, chat: &Chat) -> Result<(), AppError>;

    /// Newest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Chat>, AppError>;

    async fn get(&self, user_id: Uuid, chat_id: &str) -> Result<Option<Chat>, AppError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, user_id: Uuid, chat_id: &str) -> Result<bool, AppError>;

    async fn clear(&self, user_id: Uuid) -> Result<(), AppError>;
}

fn chat_key(chat_id: &str) -> String {
    format!("chat:{chat_id}")
}

fn index_key(user_id: Uuid) -> String {
    format!("user:chat:{user_id}")
}

fn chat_not_found() -> AppError {
    AppError::NotFound("Chat not found".to_string())
}

fn to_hash(chat: &Chat) -> Result<Vec<(&'static str, String)>, AppError> {
    let messages = serde_json::to_string(&chat.messages).context("Failed to encode chat messages")?;
    Ok(vec![
        ("id", chat.id.clone()),
        ("userId", chat.user_id.to_string()),
        ("title", chat.title.clone()),
        ("path", chat.path.clone()),
        ("createdAt", chat.created_at.to_rfc3339()),
        ("messages", messages),
    ])
}

fn from_hash(mut fields: HashMap<String, String>) -> anyhow::Result<Chat> {
    let mut take = |name: &str| {
        fields
            .remove(name)
            .ok_or_else(|| anyhow!("chat hash is missing '{name}'"))
    };

    Ok(Chat {
        id: take("id")?,
        user_id: take("userId")?.parse().context("invalid userId")?,
        title: take("title")?,
        path: take("path")?,
        created_at: DateTime::parse_from_rfc3339(&take("createdAt")?)
            .context("invalid createdAt")?
            .with_timezone(&Utc),
        messages: serde_json::from_str(&take("messages")?).context("invalid messages")?,
    })
}

/// Redis-backed store over one multiplexed connection, cloned per operation.
#[derive(Clone)]
pub struct RedisChatStore {
    conn: MultiplexedConnection,
}

impl RedisChatStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    async fn owner(&self, key: &str) -> Result<Option<Uuid>, AppError> {
        let mut conn = self.conn.clone();
        let owner: Option<String> = conn.hget(key, "userId").await?;
        Ok(owner.and_then(|o| o.parse().ok()))
    }
}

#[async_trait]
impl ChatRepository for RedisChatStore {
    async fn save(&self, chat: &Chat) -> Result<(), AppError> {
        let key = chat_key(&chat.id);
        let mut conn = self.conn.clone();

        let (owner, created_at): (Option<String>, Option<String>) = redis::cmd("HMGET")
            .arg(&key)
            .arg("userId")
            .arg("createdAt")
            .query_async(&mut conn)
            .await?;

        if let Some(owner) = owner {
            if owner != chat.user_id.to_string() {
                warn!("Refusing to overwrite chat {} owned by another user", chat.id);
                return Err(chat_not_found());
            }
        }

        let mut chat = chat.clone();
        if let Some(created_at) = created_at.and_then(|c| DateTime::parse_from_rfc3339(&c).ok()) {
            chat.created_at = created_at.with_timezone(&Utc);
        }

        let fields = to_hash(&chat)?;
        redis::pipe()
            .atomic()
            .hset_multiple(&key, fields.as_slice())
            .ignore()
            .zadd(index_key(chat.user_id), &key, chat.created_at.timestamp_millis())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        debug!("Saved chat {} ({} messages)", chat.id, chat.messages.len());
        Ok(())
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Chat>, AppError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.zrevrange(index_key(user_id), 0, -1).await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for key in &keys {
            pipe.hgetall(key);
        }
        let hashes: Vec<HashMap<String, String>> = pipe.query_async(&mut conn).await?;

        let chats = keys
            .iter()
            .zip(hashes)
            .filter(|(_, fields)| !fields.is_empty())
            .filter_map(|(key, fields)| match from_hash(fields) {
                Ok(chat) => Some(chat),
                Err(e) => {
                    warn!("Skipping unreadable chat {key}: {e:#}");
                    None
                }
            })
            .collect();
        Ok(chats)
    }

    async fn get(&self, user_id: Uuid, chat_id: &str) -> Result<Option<Chat>, AppError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(chat_key(chat_id)).await?;
        if fields.is_empty() {
            return Ok(None);
        }

        let chat = from_hash(fields)?;
        Ok((chat.user_id == user_id).then_some(chat))
    }

    async fn delete(&self, user_id: Uuid, chat_id: &str) -> Result<bool, AppError> {
        let key = chat_key(chat_id);
        if self.owner(&key).await? != Some(user_id) {
            return Ok(false);
        }

        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .zrem(index_key(user_id), &key)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(true)
    }

    async fn clear(&self, user_id: Uuid) -> Result<(), AppError> {
        let index = index_key(user_id);
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.zrange(&index, 0, -1).await?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for key in &keys {
            pipe.del(key).ignore();
        }
        pipe.del(&index).ignore();
        pipe.query_async::<_, ()>(&mut conn).await?;

        debug!("Cleared {} chats for user {user_id}", keys.len());
        Ok(())
    }
}
