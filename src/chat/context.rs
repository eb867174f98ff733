//! Conversation context assembly for the companion agent
//!
//! Builds the exact bounded message sequence handed to the agent backend:
//! the most recent history turns, each truncated to a per-turn character
//! budget, plus the pending user message. Trimming is lossy and applied
//! only for context assembly; the full content stays in the store.

use serde::{Deserialize, Serialize};

use crate::chat::types::{ChatMessage, ChatRole};

/// Maximum number of history turns forwarded to the agent
pub const MAX_HISTORY_TURNS: usize = 10;

/// Maximum characters per forwarded turn before truncation
pub const MAX_TURN_CHARS: usize = 200;

/// Marker appended directly after the character cut
pub const TRUNCATION_MARKER: &str = "...";

/// One trimmed `{role, content}` pair forwarded to the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Derived, ephemeral context value. Built fresh per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationContext {
    /// Trimmed history, oldest first
    pub ordered_turns: Vec<ContextTurn>,
    /// The new user text to append; empty signals a first-contact greeting
    pub pending_user_message: String,
}

impl ConversationContext {
    /// Returns true when both history and pending message are empty,
    /// i.e. the widget just opened and the caller should greet instead
    /// of invoking the agent.
    pub fn is_greeting_request(&self) -> bool {
        self.ordered_turns.is_empty() && self.pending_user_message.is_empty()
    }
}

/// Assembles the bounded context for one agent invocation.
///
/// Pure function of its inputs: `history` is assumed pre-sorted oldest-first
/// (the store's contract). Keeps only the `MAX_HISTORY_TURNS` most recent
/// turns and truncates each retained turn to `MAX_TURN_CHARS` characters
/// plus the truncation marker.
pub fn build_context(history: &[ChatMessage], incoming_message: &str) -> ConversationContext {
    let skip_count = history.len().saturating_sub(MAX_HISTORY_TURNS);

    let ordered_turns = history
        .iter()
        .skip(skip_count)
        .map(|msg| ContextTurn {
            role: msg.role,
            content: truncate_turn(&msg.content),
        })
        .collect();

    ConversationContext {
        ordered_turns,
        pending_user_message: incoming_message.to_string(),
    }
}

/// Truncates a turn to the per-turn budget, counting characters rather than
/// bytes so the cut never lands inside a UTF-8 sequence.
fn truncate_turn(content: &str) -> String {
    if content.chars().count() <= MAX_TURN_CHARS {
        return content.to_string();
    }
    let mut truncated: String = content.chars().take(MAX_TURN_CHARS).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
