//! Goal tracking: types, templates, and the progress state machine

pub mod store;
pub mod tracker;
pub mod types;

pub use store::GoalStore;
pub use tracker::recent_goals_summary;
pub use types::{Goal, GoalStatus, GoalTemplate, TargetType};
