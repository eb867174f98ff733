//! User profile and dynamic agent instructions
//!
//! The agent receives a plain immutable profile value per request; the
//! instruction text is a pure function of that profile. No runtime type
//! parameterization, no globals.

use serde::{Deserialize, Serialize};

/// Rider profile handed to the agent as context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sports_practiced: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wingfoil_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wingfoiling_since: Option<String>,
}

impl UserProfile {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            name: None,
            nationality: None,
            age: None,
            sports_practiced: None,
            location: None,
            wingfoil_level: None,
            wingfoiling_since: None,
        }
    }

    /// Compact one-line summary built from the populated fields only.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(name) = &self.name {
            parts.push(format!("Name: {}", name));
        }
        if let Some(nationality) = &self.nationality {
            parts.push(format!("Nationality: {}", nationality));
        }
        if let Some(age) = self.age {
            parts.push(format!("Age: {}", age));
        }
        if let Some(location) = &self.location {
            parts.push(format!("Location: {}", location));
        }
        if let Some(sports) = &self.sports_practiced {
            parts.push(format!("Sports: {}", sports));
        }
        if let Some(since) = &self.wingfoiling_since {
            parts.push(format!("Wingfoiling since: {}", since));
        }
        if let Some(level) = &self.wingfoil_level {
            parts.push(format!("Level: {}", level));
        }
        if parts.is_empty() {
            "Profile empty.".to_string()
        } else {
            parts.join(" | ")
        }
    }
}

const BASE_INSTRUCTIONS: &str = "\
You are an expert wingfoil instructor with a step-by-step conversational style. \
Your main objective is to motivate the rider to log more sessions and keep taking \
lessons on our platform. Only use information that comes from the provided context; \
never assume, infer, or invent data about the rider's progress, sessions, location, \
or history. When you lack data, offer general suggestions and finish with a \
follow-up question to confirm preferences. Keep answers concise (max 4 lines or \
3 bullet points) and end every turn with a follow-up question.";

/// Builds the instruction text for one agent invocation.
///
/// Anonymous visitors get the base instructions; known riders get the
/// base plus their profile summary and, when the caller supplies them,
/// the recent-goals and recent-sessions summaries. The summaries are the
/// only data the agent is allowed to ground progress talk on.
pub fn instructions(
    profile: Option<&UserProfile>,
    goals_summary: Option<&str>,
    sessions_summary: Option<&str>,
) -> String {
    let mut text = BASE_INSTRUCTIONS.to_string();
    if let Some(profile) = profile {
        text.push_str("\nRider profile: ");
        text.push_str(&profile.summary());
    }
    if let Some(goals) = goals_summary {
        text.push_str("\nRecent goals: ");
        text.push_str(goals);
    }
    if let Some(sessions) = sessions_summary {
        text.push_str("\nRecent sessions: ");
        text.push_str(sessions);
    }
    text
}

/// Greeting returned when the chat widget opens with an empty message.
/// The agent is not invoked for greetings.
pub fn greeting(profile: Option<&UserProfile>) -> String {
    match profile.and_then(|p| p.name.as_deref()) {
        Some(name) => format!("Hi {}! How can I help you today?", name),
        None => "Hi! Welcome to the wingfoil assistant. How can I help you today?".to_string(),
    }
}
