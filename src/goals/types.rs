use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a goal. `Completed` is terminal: nothing in this
/// crate moves a goal back to `Active`, even if progress later drops
/// below the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
}

/// What a goal's target value counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Count,
    Duration,
    Distance,
    Boolean,
}

/// A predefined goal blueprint a user can instantiate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalTemplate {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty_level: String,
    pub target_type: TargetType,
    pub default_target_value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration_days: Option<i64>,
}

/// A user's tracked objective.
///
/// Invariants: `current_progress >= 0`; `completed_date` is set exactly
/// once, at the first transition into `Completed`, and never changes
/// afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub target_value: i64,
    pub current_progress: i64,
    pub status: GoalStatus,
    pub start_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
}

impl Goal {
    pub fn new(
        id: i64,
        user_id: i64,
        title: impl Into<String>,
        description: impl Into<String>,
        target_value: i64,
    ) -> Self {
        Self {
            id,
            user_id,
            title: title.into(),
            description: description.into(),
            target_value,
            current_progress: 0,
            status: GoalStatus::Active,
            start_date: Utc::now(),
            target_date: None,
            completed_date: None,
        }
    }

    /// Instantiates a goal for a user from a template, using the
    /// template's default target value.
    pub fn from_template(id: i64, user_id: i64, template: &GoalTemplate) -> Self {
        Self::new(
            id,
            user_id,
            template.title.clone(),
            template.description.clone(),
            template.default_target_value,
        )
    }

    pub fn with_target_date(mut self, target_date: DateTime<Utc>) -> Self {
        self.target_date = Some(target_date);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == GoalStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_goal_starts_active_at_zero() {
        let goal = Goal::new(1, 7, "Land 10 jibes", "Ten clean jibes in a row", 10);
        assert_eq!(goal.status, GoalStatus::Active);
        assert_eq!(goal.current_progress, 0);
        assert!(goal.completed_date.is_none());
        assert!(!goal.is_completed());
    }

    #[test]
    fn test_from_template() {
        let template = GoalTemplate {
            id: 2,
            title: "First flight".to_string(),
            description: "Hold foil flight for 30 seconds".to_string(),
            category: "progression".to_string(),
            difficulty_level: "beginner".to_string(),
            target_type: TargetType::Duration,
            default_target_value: 30,
            estimated_duration_days: Some(14),
        };

        let goal = Goal::from_template(5, 7, &template);
        assert_eq!(goal.id, 5);
        assert_eq!(goal.user_id, 7);
        assert_eq!(goal.title, "First flight");
        assert_eq!(goal.target_value, 30);
        assert_eq!(goal.status, GoalStatus::Active);
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&GoalStatus::Completed).unwrap(),
            "\"completed\""
        );
        let status: GoalStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(status, GoalStatus::Active);
    }
}
