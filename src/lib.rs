//! wingmate - wingfoil training companion core
//!
//! Conversation-context assembly and goal-progress tracking for a
//! wingfoil training companion, plus the agent-client seam and the thin
//! storage and config layers around them.

pub mod agent;
pub mod chat;
pub mod cli;
pub mod config;
pub mod goals;
pub mod profile;
pub mod training;
pub mod utils;
