//! Agent invocation seam
//!
//! The companion core never talks to a model directly; it hands the
//! assembled context to an `AgentClient` and gets back either a reply or
//! a guardrail block. Guardrail blocks are a normal outcome, not an error.

use async_trait::async_trait;

use crate::chat::ConversationContext;
use crate::utils::Result;

/// Outcome of one agent invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutcome {
    /// The agent produced a reply
    Reply(String),
    /// The input guardrail tripped; the caller shows a fixed blocked message
    Blocked,
}

/// Interface to the external agent backend
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Invokes the agent with per-request instructions and the bounded
    /// conversation context.
    async fn invoke(
        &self,
        instructions: &str,
        context: &ConversationContext,
    ) -> Result<AgentOutcome>;
}
