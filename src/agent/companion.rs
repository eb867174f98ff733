//! Companion chat pipeline
//!
//! Orchestrates one inbound chat turn: greeting short-circuit, turn
//! validation and bookkeeping, context assembly, agent invocation, and
//! the guardrail-block mapping.

use std::sync::Arc;

use tracing::{debug, info};

use crate::agent::client::{AgentClient, AgentOutcome};
use crate::chat::{ConversationStore, build_context};
use crate::goals::{Goal, recent_goals_summary};
use crate::profile::{self, UserProfile};
use crate::training::{TrainingSession, recent_sessions_summary};
use crate::utils::Result;

/// Fixed user-facing reply when the input guardrail trips
pub const BLOCKED_MESSAGE: &str = "Message blocked due to inappropriate language.";

/// Goals/sessions included per instruction block, newest first
const CONTEXT_SUMMARY_LIMIT: usize = 5;

/// Ties the conversation store and the agent client together.
///
/// Constructed once at startup; the agent client handle is injected
/// rather than held as a global.
pub struct Companion {
    store: Arc<ConversationStore>,
    client: Arc<dyn AgentClient>,
}

impl Companion {
    pub fn new(store: Arc<ConversationStore>, client: Arc<dyn AgentClient>) -> Self {
        Self { store, client }
    }

    /// Handles one inbound chat message and returns the reply text.
    ///
    /// An empty message signals the widget opening: the caller gets a
    /// greeting and the agent is never invoked. Otherwise the context is
    /// assembled from the history stored so far, the user turn is
    /// recorded, the agent is invoked, and its reply is recorded as the
    /// assistant turn. A guardrail block maps to the fixed blocked
    /// message and is not recorded.
    ///
    /// For known riders the caller supplies their goals and training
    /// sessions (oldest first); summaries of the most recent ones ride
    /// along in the instruction text so the agent can talk about real
    /// progress. Anonymous callers pass empty slices.
    pub async fn handle_message(
        &self,
        conversation_id: &str,
        user_message: &str,
        user_profile: Option<&UserProfile>,
        goals: &[Goal],
        sessions: &[TrainingSession],
    ) -> Result<String> {
        if user_message.trim().is_empty() {
            debug!(conversation_id = %conversation_id, "Empty message, returning greeting");
            return Ok(profile::greeting(user_profile));
        }

        let user_id = user_profile.map(|p| p.id);

        // Context is built from the turns stored before this one; the new
        // message rides along as the pending user message.
        let history = self.store.fetch_history(conversation_id).await;
        let context = build_context(&history, user_message);

        self.store
            .append_turn(conversation_id, "user", user_message, user_id)
            .await?;

        let goals_summary =
            user_profile.map(|_| recent_goals_summary(goals, CONTEXT_SUMMARY_LIMIT));
        let sessions_summary =
            user_profile.map(|_| recent_sessions_summary(sessions, CONTEXT_SUMMARY_LIMIT));
        let instructions = profile::instructions(
            user_profile,
            goals_summary.as_deref(),
            sessions_summary.as_deref(),
        );
        let outcome = self.client.invoke(&instructions, &context).await?;

        let reply = match outcome {
            AgentOutcome::Reply(text) => text,
            AgentOutcome::Blocked => {
                info!(conversation_id = %conversation_id, "Guardrail tripped, returning blocked message");
                return Ok(BLOCKED_MESSAGE.to_string());
            }
        };

        self.store
            .append_turn(conversation_id, "assistant", &reply, user_id)
            .await?;

        Ok(reply)
    }
}
