//! File-backed goal storage for the CLI
//!
//! One JSON file holds all goals. Ownership is enforced here: a progress
//! update only sees the caller's own goals. Concurrent updates to the
//! same goal are last-write-wins; callers needing stronger guarantees
//! must serialize at a higher level.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::goals::types::Goal;
use crate::utils::{Result, WingmateError};

pub struct GoalStore {
    goals: Arc<RwLock<Vec<Goal>>>,
    file_path: PathBuf,
}

impl GoalStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            goals: Arc::new(RwLock::new(Vec::new())),
            file_path: data_dir.join("goals.json"),
        }
    }

    /// Creates the data directory and loads existing goals.
    pub async fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| WingmateError::io(parent, e))?;
        }

        match fs::read_to_string(&self.file_path).await {
            Ok(json) => {
                let loaded: Vec<Goal> = serde_json::from_str(&json)?;
                let count = loaded.len();
                *self.goals.write().await = loaded;
                info!(goals = count, "Goal store initialized");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.file_path.display(), "No goal file yet, starting empty");
            }
            Err(e) => return Err(WingmateError::io(&self.file_path, e)),
        }

        Ok(())
    }

    /// Adds a goal, assigning the next free id. Returns the stored goal.
    pub async fn add(&self, mut goal: Goal) -> Result<Goal> {
        {
            let mut guard = self.goals.write().await;
            let next_id = guard.iter().map(|g| g.id).max().unwrap_or(0) + 1;
            goal.id = next_id;
            guard.push(goal.clone());
        }
        self.save().await?;
        Ok(goal)
    }

    /// All goals owned by a user, in insertion order.
    pub async fn list(&self, user_id: i64) -> Vec<Goal> {
        let guard = self.goals.read().await;
        guard
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Applies a progress update to one of the user's goals and persists
    /// the result. Goals owned by other users are invisible here.
    pub async fn update_progress<F>(&self, user_id: i64, goal_id: i64, update: F) -> Result<Goal>
    where
        F: FnOnce(&mut Goal) -> Result<()>,
    {
        let updated = {
            let mut guard = self.goals.write().await;
            let goal = guard
                .iter_mut()
                .find(|g| g.id == goal_id && g.user_id == user_id)
                .ok_or(WingmateError::GoalNotFound { goal_id })?;
            update(goal)?;
            goal.clone()
        };

        self.save().await?;
        Ok(updated)
    }

    async fn save(&self) -> Result<()> {
        let json = {
            let guard = self.goals.read().await;
            serde_json::to_string_pretty(&*guard)?
        };
        fs::write(&self.file_path, json)
            .await
            .map_err(|e| WingmateError::io(&self.file_path, e))?;
        Ok(())
    }
}
