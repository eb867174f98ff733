use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::schema::Config;

#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
static CONFIG_TEST_ENV_LOCK: Mutex<()> = Mutex::new(());

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file contains invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
}

/// Loads configuration in three layers: config file, then environment
/// variables, then CLI flags (highest precedence).
pub fn load_config(cli_model: Option<String>, cli_config_path: Option<PathBuf>) -> Result<Config> {
    tracing::debug!("Loading configuration");

    let mut config = Config::default();

    // Layer 1: config file (~/.wingmate/config.json)
    let config_file = cli_config_path.or_else(get_default_config_path);

    if let Some(ref path) = config_file {
        if path.exists() {
            tracing::debug!(config_path = %path.display(), "Loading configuration from file");
            config = merge_config_from_file(config, path)?;
        } else {
            tracing::debug!(config_path = %path.display(), "Config file not found, using defaults");
        }
    }

    // Layer 2: environment variables
    config = merge_env_variables(config);

    // Layer 3: CLI flags
    if let Some(model) = cli_model {
        tracing::debug!(model = %model, "Applying CLI model override");
        config.model = Some(model);
    }

    let summary = config.get_safe_summary();
    tracing::debug!(
        api_key_configured = summary.api_key_configured,
        model = ?summary.model,
        data_dir = ?summary.data_dir,
        "Configuration loaded successfully"
    );

    Ok(config)
}

pub fn get_default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".wingmate").join("config.json"))
}

/// Default data directory (~/.wingmate/data) unless configured otherwise
pub fn resolve_data_dir(config: &Config) -> Result<PathBuf> {
    if let Some(dir) = &config.data_dir {
        return Ok(dir.clone());
    }
    dirs::home_dir()
        .map(|home| home.join(".wingmate").join("data"))
        .context("Could not determine home directory for data dir")
}

fn merge_config_from_file(config: Config, path: &PathBuf) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let file_config: Config = serde_json::from_str(&content).map_err(ConfigError::InvalidJson)?;

    Ok(Config {
        api_key: file_config.api_key.or(config.api_key),
        base_url: file_config.base_url.or(config.base_url),
        model: file_config.model.or(config.model),
        data_dir: file_config.data_dir.or(config.data_dir),
        timeout_seconds: file_config.timeout_seconds.or(config.timeout_seconds),
    })
}

fn merge_env_variables(mut config: Config) -> Config {
    // Empty strings are treated as unset
    let env_key = std::env::var("WINGMATE_API_KEY")
        .ok()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .filter(|k| !k.is_empty());
    if let Some(key) = env_key {
        config.api_key = Some(key);
    }

    if let Some(model) = std::env::var("WINGMATE_MODEL").ok().filter(|m| !m.is_empty()) {
        config.model = Some(model);
    }

    if let Some(dir) = std::env::var("WINGMATE_DATA_DIR")
        .ok()
        .filter(|d| !d.is_empty())
    {
        config.data_dir = Some(PathBuf::from(dir));
    }

    config
}

/// Writes the config file with owner-only permissions.
pub fn save_config(config: &Config, path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, json).with_context(|| format!("Failed to write config file: {:?}", path))?;

    // The file may hold an API key
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set permissions on: {:?}", path))?;
    }

    Ok(())
}
