//! Goal progress updates and the completion transition
//!
//! The only state transition is `Active -> Completed`, fired exactly when
//! an update pushes progress to or past the target. Completion is a one-way
//! milestone, not a live gauge: later updates may change the stored value
//! but never the status or completion date.

use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::goals::types::{Goal, GoalStatus};
use crate::utils::{Result, WingmateError};

impl Goal {
    /// Sets progress to an absolute value.
    ///
    /// Rejects negative values before any mutation. Fires the completion
    /// transition when an active goal reaches its target; a goal that is
    /// already completed keeps the new value for display but its status
    /// and completion date stay untouched.
    pub fn set_progress(&mut self, new_value: i64) -> Result<()> {
        if new_value < 0 {
            return Err(WingmateError::invalid_progress(format!(
                "progress must be >= 0, got {}",
                new_value
            )));
        }

        self.current_progress = new_value;

        if self.status == GoalStatus::Active && new_value >= self.target_value {
            self.status = GoalStatus::Completed;
            self.completed_date = Some(Utc::now());
            info!(
                goal_id = self.id,
                user_id = self.user_id,
                target_value = self.target_value,
                "Goal completed"
            );
        }

        Ok(())
    }

    /// Adjusts progress by a signed delta. Rejects the update if the
    /// resulting value would be negative or overflow.
    pub fn increment_progress(&mut self, delta: i64) -> Result<()> {
        let new_value = self.current_progress.checked_add(delta).ok_or_else(|| {
            WingmateError::invalid_progress(format!(
                "delta {} overflows progress (current: {})",
                delta, self.current_progress
            ))
        })?;
        if new_value < 0 {
            return Err(WingmateError::invalid_progress(format!(
                "delta {} would take progress below zero (current: {})",
                delta, self.current_progress
            )));
        }
        self.set_progress(new_value)
    }

    /// Percentage of the target reached, clamped to 100.0 and rounded to
    /// one decimal. A zero target is a degenerate goal (no upstream
    /// validation prevents it) and reads as 0.0 rather than an error.
    pub fn progress_percentage(&self) -> f64 {
        if self.target_value <= 0 {
            return 0.0;
        }
        let raw = self.current_progress as f64 / self.target_value as f64 * 100.0;
        let rounded = (raw * 10.0).round() / 10.0;
        rounded.min(100.0)
    }
}

/// JSON summary of the most recent goals, newest first, for injection
/// into the agent context.
pub fn recent_goals_summary(goals: &[Goal], limit: usize) -> String {
    if goals.is_empty() {
        return "No goals recorded.".to_string();
    }

    let entries: Vec<serde_json::Value> = goals
        .iter()
        .rev()
        .take(limit)
        .map(|g| {
            json!({
                "title": g.title,
                "description": g.description,
                "target_date": g.target_date.map(|d| d.to_rfc3339()),
                "current_progress": g.current_progress,
                "target_value": g.target_value,
            })
        })
        .collect();

    serde_json::to_string(&entries).unwrap_or_else(|_| "No goals recorded.".to_string())
}
