//! Agent integration: the invocation seam, the OpenAI-compatible client,
//! and the companion chat pipeline

pub mod client;
pub mod companion;
pub mod openai;

pub use client::{AgentClient, AgentOutcome};
pub use companion::{BLOCKED_MESSAGE, Companion};
pub use openai::OpenAiAgentClient;
