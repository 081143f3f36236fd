use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm_client::{Message, Part, Role};
use crate::streaming::Annotation;

pub const TITLE_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl ChatMessage {
    pub fn to_prompt_message(&self) -> Message {
        Message {
            role: match self.role {
                ChatRole::User => Role::User,
                ChatRole::Assistant => Role::Assistant,
            },
            parts: vec![Part::Text(self.content.clone())],
        }
    }
}

/// A saved conversation. Serialized camelCase for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub user_id: Uuid,
    pub title: String,
    pub path: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(id: String, user_id: Uuid, messages: Vec<ChatMessage>, now: DateTime<Utc>) -> Self {
        let title = messages
            .iter()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.trim().chars().take(TITLE_MAX_CHARS).collect())
            .unwrap_or_else(|| "New chat".to_string());

        Self {
            path: format!("/dashboard/chat/{id}"),
            id,
            user_id,
            title,
            messages,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(role: ChatRole, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
            annotations: Vec::new(),
        }
    }

    #[test]
    fn test_title_is_first_user_message_truncated() {
        let long = "é".repeat(150);
        let chat = Chat::new(
            "abc".to_string(),
            Uuid::new_v4(),
            vec![message(ChatRole::Assistant, "hi"), message(ChatRole::User, &long)],
            Utc::now(),
        );
        assert_eq!(chat.title.chars().count(), TITLE_MAX_CHARS);
        assert_eq!(chat.path, "/dashboard/chat/abc");
    }

    #[test]
    fn test_message_deserializes_without_annotations() {
        let msg: ChatMessage =
            serde_json::from_value(json!({ "role": "user", "content": "Data roles in Berlin?" }))
                .unwrap();
        assert_eq!(msg.role, ChatRole::User);
        assert!(msg.annotations.is_empty());
        assert_eq!(msg.to_prompt_message(), Message::user_text("Data roles in Berlin?"));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let parsed = serde_json::from_value::<ChatMessage>(json!({ "role": "system", "content": "x" }));
        assert!(parsed.is_err());
    }
}
