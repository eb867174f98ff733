//! Conversation storage
//!
//! In-memory conversation map with JSON file persistence, one file per
//! conversation. Turn validation (role, non-empty content) happens here
//! before anything is written.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::chat::types::{ChatMessage, ChatRole};
use crate::utils::{Result, WingmateError};

/// A conversation and its ordered turns, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            conversation_id: conversation_id.into(),
            created_at: now,
            last_accessed: now,
            messages: Vec::new(),
        }
    }

    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.last_accessed = Utc::now();
    }
}

/// Conversation store backed by JSON files in a single directory.
///
/// Lock scope pattern: read/write locks are held only for map access and
/// message append, never across disk I/O.
pub struct ConversationStore {
    conversations: Arc<RwLock<HashMap<String, Conversation>>>,
    conversations_dir: PathBuf,
}

impl ConversationStore {
    pub fn new(conversations_dir: PathBuf) -> Self {
        Self {
            conversations: Arc::new(RwLock::new(HashMap::new())),
            conversations_dir,
        }
    }

    /// Creates the storage directory and loads existing conversations.
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.conversations_dir)
            .await
            .map_err(|e| WingmateError::io(&self.conversations_dir, e))?;

        let loaded = self.load_all().await?;
        let mut guard = self.conversations.write().await;
        let count = loaded.len();
        for conversation in loaded {
            guard.insert(conversation.conversation_id.clone(), conversation);
        }
        drop(guard);

        info!(conversations = count, "Conversation store initialized");
        Ok(())
    }

    /// Validates and appends one turn, then persists the conversation.
    ///
    /// Role must be `user` or `assistant` and content must be non-empty;
    /// both are checked before any persistence attempt.
    pub async fn append_turn(
        &self,
        conversation_id: &str,
        role: &str,
        content: &str,
        user_id: Option<i64>,
    ) -> Result<ChatMessage> {
        let role = ChatRole::parse(role)?;
        if content.trim().is_empty() {
            return Err(WingmateError::EmptyContent);
        }

        let message = ChatMessage::new(conversation_id, role, content, user_id);

        let conversation = {
            let mut guard = self.conversations.write().await;
            let conversation = guard
                .entry(conversation_id.to_string())
                .or_insert_with(|| Conversation::new(conversation_id));
            conversation.add_message(message.clone());
            conversation.clone()
            // Lock released here via scope end
        };

        self.save(&conversation).await?;

        debug!(
            conversation_id = %conversation_id,
            role = %message.role,
            turns = conversation.messages.len(),
            "Appended chat turn"
        );
        Ok(message)
    }

    /// Returns the full history for a conversation, oldest first.
    /// Unknown conversations yield an empty history.
    pub async fn fetch_history(&self, conversation_id: &str) -> Vec<ChatMessage> {
        let guard = self.conversations.read().await;
        guard
            .get(conversation_id)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    /// Returns a conversation snapshot if it exists.
    pub async fn get_conversation(&self, conversation_id: &str) -> Option<Conversation> {
        let guard = self.conversations.read().await;
        guard.get(conversation_id).cloned()
    }

    async fn save(&self, conversation: &Conversation) -> Result<()> {
        let file_path = self
            .conversations_dir
            .join(format!("{}.json", conversation.conversation_id));
        let json = serde_json::to_string_pretty(conversation)?;

        fs::write(&file_path, json).await.map_err(|e| {
            WingmateError::conversation_persistence(
                &conversation.conversation_id,
                format!("write {}: {}", file_path.display(), e),
            )
        })?;

        // Chat logs are private user data
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(&file_path, permissions).await.map_err(|e| {
                WingmateError::conversation_persistence(
                    &conversation.conversation_id,
                    format!("set permissions on {}: {}", file_path.display(), e),
                )
            })?;
        }

        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Conversation>> {
        let mut conversations = Vec::new();

        let mut entries = fs::read_dir(&self.conversations_dir)
            .await
            .map_err(|e| WingmateError::io(&self.conversations_dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| WingmateError::io(&self.conversations_dir, e))?
        {
            let path = entry.path();
            // Only .json files (not .corrupted quarantine files)
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            match fs::read_to_string(&path).await {
                Ok(json) => match serde_json::from_str::<Conversation>(&json) {
                    Ok(conversation) => conversations.push(conversation),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Quarantining corrupted conversation file");
                        let corrupted = path.with_extension("corrupted");
                        if let Err(rename_err) = fs::rename(&path, &corrupted).await {
                            warn!(path = %path.display(), error = %rename_err, "Failed to quarantine file");
                        }
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read conversation file");
                }
            }
        }

        Ok(conversations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (TempDir, ConversationStore) {
        let dir = TempDir::new().unwrap();
        let store = ConversationStore::new(dir.path().to_path_buf());
        store.initialize().await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_append_turn_and_fetch_history() {
        let (_dir, store) = store().await;

        store
            .append_turn("widget-1", "user", "How do I jibe?", Some(3))
            .await
            .unwrap();
        store
            .append_turn("widget-1", "assistant", "Start with speed.", Some(3))
            .await
            .unwrap();

        let history = store.fetch_history("widget-1").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[1].role, ChatRole::Assistant);
        assert_eq!(history[0].content, "How do I jibe?");
    }

    #[tokio::test]
    async fn test_append_turn_rejects_bad_role() {
        let (_dir, store) = store().await;
        let err = store
            .append_turn("widget-1", "system", "nope", None)
            .await
            .unwrap_err();
        assert!(matches!(err, WingmateError::InvalidRole { .. }));
        // Nothing persisted
        assert!(store.fetch_history("widget-1").await.is_empty());
    }

    #[tokio::test]
    async fn test_append_turn_rejects_empty_content() {
        let (_dir, store) = store().await;
        let err = store
            .append_turn("widget-1", "user", "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, WingmateError::EmptyContent));
        assert!(store.fetch_history("widget-1").await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_conversation_yields_empty_history() {
        let (_dir, store) = store().await;
        assert!(store.fetch_history("missing").await.is_empty());
    }

    #[tokio::test]
    async fn test_history_survives_restart() {
        let dir = TempDir::new().unwrap();

        let store = ConversationStore::new(dir.path().to_path_buf());
        store.initialize().await.unwrap();
        store
            .append_turn("widget-9", "user", "Hello", None)
            .await
            .unwrap();

        let reopened = ConversationStore::new(dir.path().to_path_buf());
        reopened.initialize().await.unwrap();
        let history = reopened.fetch_history("widget-9").await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "Hello");
    }

    #[tokio::test]
    async fn test_save_failure_surfaces_persistence_error() {
        let dir = TempDir::new().unwrap();
        let conversations_dir = dir.path().join("conversations");
        let store = ConversationStore::new(conversations_dir.clone());
        store.initialize().await.unwrap();

        // Pull the directory out from under the store
        tokio::fs::remove_dir_all(&conversations_dir).await.unwrap();

        let err = store
            .append_turn("widget-1", "user", "hello", None)
            .await
            .unwrap_err();
        assert!(matches!(err, WingmateError::ConversationPersistence { .. }));
        assert!(err.to_string().contains("widget-1"));
    }

    #[tokio::test]
    async fn test_corrupted_file_is_quarantined() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("widget-bad.json"), "not valid json").unwrap();

        let store = ConversationStore::new(dir.path().to_path_buf());
        store.initialize().await.unwrap();

        assert!(store.fetch_history("widget-bad").await.is_empty());
        assert!(dir.path().join("widget-bad.corrupted").exists());
        assert!(!dir.path().join("widget-bad.json").exists());
    }
}
