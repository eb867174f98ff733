//! Training log records and agent-facing summaries

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One logged on-water session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSession {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub sport_type: String,
    /// Minutes on the water
    pub duration: i64,
    /// Self-assessed session rating, 1-10
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenges: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_feedback: Option<String>,
}

impl TrainingSession {
    pub fn new(
        id: i64,
        user_id: i64,
        date: NaiveDate,
        sport_type: impl Into<String>,
        duration: i64,
    ) -> Self {
        Self {
            id,
            user_id,
            date,
            sport_type: sport_type.into(),
            duration,
            rating: None,
            location: None,
            notes: None,
            achievements: None,
            challenges: None,
            conditions: None,
            instructor_feedback: None,
        }
    }
}

/// JSON summary of the most recent sessions, newest first, for injection
/// into the agent context. `sessions` is assumed ordered oldest-first.
pub fn recent_sessions_summary(sessions: &[TrainingSession], limit: usize) -> String {
    if sessions.is_empty() {
        return "No sessions recorded.".to_string();
    }

    let entries: Vec<serde_json::Value> = sessions
        .iter()
        .rev()
        .take(limit)
        .map(|s| {
            json!({
                "date": s.date.to_string(),
                "sport_type": s.sport_type,
                "duration": s.duration,
                "rating": s.rating,
                "location": s.location,
                "notes": s.notes,
                "achievements": s.achievements,
                "challenges": s.challenges,
                "conditions": s.conditions,
                "instructor_feedback": s.instructor_feedback,
            })
        })
        .collect();

    serde_json::to_string(&entries).unwrap_or_else(|_| "No sessions recorded.".to_string())
}
