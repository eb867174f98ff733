use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::agent::{Companion, OpenAiAgentClient};
use crate::chat::ConversationStore;
use crate::config::{self, Config};
use crate::goals::{Goal, GoalStore};
use crate::profile::UserProfile;

#[derive(Parser)]
#[command(name = "wingmate")]
#[command(about = "wingmate - wingfoil training companion")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Model override
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Path to config file (default: ~/.wingmate/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Acting user id
    #[arg(long, global = true, default_value_t = 1)]
    pub user: i64,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chat with the companion assistant
    Chat {
        /// Conversation to resume (default: one per user)
        #[arg(long)]
        conversation: Option<String>,
    },
    /// Manage training goals
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a goal
    Add {
        title: String,
        /// Target value (e.g. 10 jibes, 60 minutes)
        #[arg(long)]
        target: i64,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Set or adjust progress on a goal
    Progress {
        id: i64,
        /// Absolute progress value
        #[arg(long, conflicts_with = "delta")]
        set: Option<i64>,
        /// Signed adjustment to the current value
        #[arg(long, allow_hyphen_values = true)]
        delta: Option<i64>,
    },
    /// List goals with progress
    List,
}

pub fn run(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.model.clone(), cli.config.clone())?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async {
        match cli.command {
            Some(Commands::Chat { conversation }) => run_chat(&config, cli.user, conversation).await,
            Some(Commands::Goal { command }) => run_goal(&config, cli.user, command).await,
            Some(Commands::Version) | None => {
                println!("wingmate {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    })
}

async fn run_chat(config: &Config, user: i64, conversation: Option<String>) -> Result<()> {
    let api_key = config
        .api_key
        .clone()
        .context("No API key configured. Set WINGMATE_API_KEY or add api_key to the config file.")?;

    let data_dir = config::resolve_data_dir(config)?;
    let store = Arc::new(ConversationStore::new(data_dir.join("conversations")));
    store.initialize().await?;

    let client = OpenAiAgentClient::new(
        api_key,
        config
            .base_url
            .clone()
            .unwrap_or_else(|| crate::config::schema::DEFAULT_BASE_URL.to_string()),
        config
            .model
            .clone()
            .unwrap_or_else(|| crate::config::schema::DEFAULT_MODEL.to_string()),
        config
            .timeout_seconds
            .unwrap_or(crate::config::schema::DEFAULT_TIMEOUT_SECONDS),
    )?;

    let companion = Companion::new(store, Arc::new(client));
    let profile = load_profile(&data_dir, user).await;
    let conversation_id = conversation.unwrap_or_else(|| format!("cli_{}", user));

    // The rider's goals ground the assistant's progress talk. No session
    // log exists on this side yet, so that summary stays empty.
    let goal_store = GoalStore::new(data_dir.clone());
    goal_store.initialize().await?;
    let goals = goal_store.list(user).await;

    // Widget-open greeting
    let greeting = companion
        .handle_message(&conversation_id, "", profile.as_ref(), &goals, &[])
        .await?;
    println!("{}", greeting);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let message = line.trim();
        if message.is_empty() || message == "/quit" {
            break;
        }

        match companion
            .handle_message(&conversation_id, message, profile.as_ref(), &goals, &[])
            .await
        {
            Ok(reply) => println!("{}", reply),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    Ok(())
}

async fn run_goal(config: &Config, user: i64, command: GoalCommands) -> Result<()> {
    let data_dir = config::resolve_data_dir(config)?;
    let store = GoalStore::new(data_dir);
    store.initialize().await?;

    match command {
        GoalCommands::Add {
            title,
            target,
            description,
        } => {
            let goal = store
                .add(Goal::new(0, user, title, description, target))
                .await?;
            println!("Created goal #{}: {} (target {})", goal.id, goal.title, goal.target_value);
        }
        GoalCommands::Progress { id, set, delta } => {
            let updated = store
                .update_progress(user, id, |goal| match (set, delta) {
                    (Some(value), _) => goal.set_progress(value),
                    (None, Some(delta)) => goal.increment_progress(delta),
                    (None, None) => Ok(()),
                })
                .await?;
            println!(
                "Goal #{}: {}/{} ({:.1}%) [{}]",
                updated.id,
                updated.current_progress,
                updated.target_value,
                updated.progress_percentage(),
                if updated.is_completed() { "completed" } else { "active" },
            );
        }
        GoalCommands::List => {
            let goals = store.list(user).await;
            if goals.is_empty() {
                println!("No goals yet. Create one with: wingmate goal add <title> --target <n>");
            }
            for goal in goals {
                println!(
                    "#{} {} - {}/{} ({:.1}%) [{}]",
                    goal.id,
                    goal.title,
                    goal.current_progress,
                    goal.target_value,
                    goal.progress_percentage(),
                    if goal.is_completed() { "completed" } else { "active" },
                );
            }
        }
    }

    Ok(())
}

/// Loads the acting user's profile from the data dir, if one was saved.
/// Chat works anonymously without it.
async fn load_profile(data_dir: &std::path::Path, user: i64) -> Option<UserProfile> {
    let path = data_dir.join(format!("profile_{}.json", user));
    match tokio::fs::read_to_string(&path).await {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable profile file");
                None
            }
        },
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_goal_progress_flags() {
        let cli = Cli::parse_from(["wingmate", "goal", "progress", "3", "--delta", "-2"]);
        match cli.command {
            Some(Commands::Goal {
                command: GoalCommands::Progress { id, set, delta },
            }) => {
                assert_eq!(id, 3);
                assert_eq!(set, None);
                assert_eq!(delta, Some(-2));
            }
            _ => panic!("expected goal progress command"),
        }
    }

    #[test]
    fn test_default_user() {
        let cli = Cli::parse_from(["wingmate", "goal", "list"]);
        assert_eq!(cli.user, 1);
    }
}
