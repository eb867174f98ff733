use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{Result, WingmateError};

/// Role of a chat turn. Only user and assistant turns exist in a
/// companion conversation; system instructions are injected separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Parses a role string, rejecting anything that is not user/assistant.
    pub fn parse(role: &str) -> Result<Self> {
        match role {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            other => Err(WingmateError::invalid_role(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn in a conversation, immutable once created.
///
/// Turns belonging to the same conversation are totally ordered by
/// timestamp; ties keep insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub conversation_id: String,
    /// Absent for anonymous visitors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl ChatMessage {
    pub fn new(
        conversation_id: impl Into<String>,
        role: ChatRole,
        content: impl Into<String>,
        user_id: Option<i64>,
    ) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            conversation_id: conversation_id.into(),
            user_id,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == ChatRole::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == ChatRole::Assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_valid() {
        assert_eq!(ChatRole::parse("user").unwrap(), ChatRole::User);
        assert_eq!(ChatRole::parse("assistant").unwrap(), ChatRole::Assistant);
    }

    #[test]
    fn test_role_parse_invalid() {
        let err = ChatRole::parse("system").unwrap_err();
        assert!(matches!(err, WingmateError::InvalidRole { .. }));
        assert!(err.to_string().contains("system"));
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&ChatRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let role: ChatRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, ChatRole::User);
    }

    #[test]
    fn test_message_creation() {
        let msg = ChatMessage::new("widget-42", ChatRole::User, "Hello!", Some(7));
        assert_eq!(msg.conversation_id, "widget-42");
        assert!(msg.is_user());
        assert!(!msg.is_assistant());
        assert_eq!(msg.user_id, Some(7));
        let now = Utc::now();
        assert!(now.signed_duration_since(msg.timestamp).num_seconds() < 5);
    }

    #[test]
    fn test_anonymous_message_omits_user_id() {
        let msg = ChatMessage::new("widget-1", ChatRole::Assistant, "Hi", None);
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("user_id"));
    }
}
