//! OpenAI-compatible agent client
//!
//! Implements `AgentClient` against any OpenAI-compatible chat-completions
//! endpoint. Instructions go in as the system message, the trimmed history
//! turns follow, and the pending user message goes last. A `content_filter`
//! finish reason or a refusal is reported as a guardrail block.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::agent::client::{AgentClient, AgentOutcome};
use crate::chat::ConversationContext;
use crate::utils::{Result, WingmateError};

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Agent client for OpenAI-compatible chat-completions APIs.
///
/// Built once at startup and shared by handle; holds no request state.
#[derive(Debug, Clone)]
pub struct OpenAiAgentClient {
    api_key: String,
    base_url: String,
    model: String,
    client: Client,
}

impl OpenAiAgentClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| WingmateError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            client,
        })
    }

    fn build_request(&self, instructions: &str, context: &ConversationContext) -> ChatRequest {
        let mut messages = Vec::with_capacity(context.ordered_turns.len() + 2);
        messages.push(WireMessage {
            role: "system".to_string(),
            content: Some(instructions.to_string()),
            refusal: None,
        });
        for turn in &context.ordered_turns {
            messages.push(WireMessage {
                role: turn.role.as_str().to_string(),
                content: Some(turn.content.clone()),
                refusal: None,
            });
        }
        messages.push(WireMessage {
            role: "user".to_string(),
            content: Some(context.pending_user_message.clone()),
            refusal: None,
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
        }
    }

    async fn send_with_retry(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(attempt = attempt, url = %url, "Sending agent request");

            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(request)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    match status {
                        StatusCode::OK => {
                            return resp.json::<ChatResponse>().await.map_err(|e| {
                                WingmateError::serialization(format!(
                                    "Failed to parse agent response: {}",
                                    e
                                ))
                            });
                        }
                        StatusCode::TOO_MANY_REQUESTS => {
                            if attempt >= MAX_RETRIES {
                                let body = resp.text().await.unwrap_or_default();
                                return Err(WingmateError::external_service(
                                    "agent",
                                    format!(
                                        "Rate limit exceeded after {} retries: {}",
                                        MAX_RETRIES, body
                                    ),
                                ));
                            }
                            let delay = 2_u64.pow(attempt - 1); // 1s, 2s, 4s
                            warn!(
                                attempt = attempt,
                                delay_secs = delay,
                                "Rate limited, retrying with exponential backoff"
                            );
                            tokio::time::sleep(Duration::from_secs(delay)).await;
                        }
                        status if status.is_server_error() && attempt < MAX_RETRIES => {
                            let delay = 2_u64.pow(attempt - 1);
                            warn!(status = %status, attempt = attempt, "Server error, retrying");
                            tokio::time::sleep(Duration::from_secs(delay)).await;
                        }
                        status => {
                            let body = resp.text().await.unwrap_or_default();
                            return Err(WingmateError::external_service(
                                "agent",
                                format!("Request failed ({}): {}", status, body),
                            ));
                        }
                    }
                }
                Err(e) if attempt < MAX_RETRIES && (e.is_timeout() || e.is_connect()) => {
                    let delay = 2_u64.pow(attempt - 1);
                    warn!(error = %e, attempt = attempt, "Network error, retrying");
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn parse_outcome(&self, response: ChatResponse) -> Result<AgentOutcome> {
        if let Some(error) = response.error {
            // Content-policy rejections are a block, not an error
            if error.code.as_deref() == Some("content_filter") {
                return Ok(AgentOutcome::Blocked);
            }
            return Err(WingmateError::external_service("agent", error.message));
        }

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            WingmateError::external_service("agent", "No response choices returned")
        })?;

        if choice.finish_reason.as_deref() == Some("content_filter")
            || choice.message.refusal.is_some()
        {
            return Ok(AgentOutcome::Blocked);
        }

        match choice.message.content {
            Some(content) if !content.is_empty() => Ok(AgentOutcome::Reply(content)),
            _ => Err(WingmateError::external_service(
                "agent",
                "Agent returned an empty reply",
            )),
        }
    }
}

#[async_trait]
impl AgentClient for OpenAiAgentClient {
    async fn invoke(
        &self,
        instructions: &str,
        context: &ConversationContext,
    ) -> Result<AgentOutcome> {
        let request = self.build_request(instructions, context);
        let response = self.send_with_retry(&request).await?;
        self.parse_outcome(response)
    }
}
