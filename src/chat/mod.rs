//! Chat data model, conversation storage, and context assembly

pub mod context;
pub mod store;
pub mod types;

pub use context::{
    ConversationContext, ContextTurn, MAX_HISTORY_TURNS, MAX_TURN_CHARS, TRUNCATION_MARKER,
    build_context,
};
pub use store::{Conversation, ConversationStore};
pub use types::{ChatMessage, ChatRole};
