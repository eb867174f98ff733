use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Directory holding conversation and goal files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            model: Some(DEFAULT_MODEL.to_string()),
            data_dir: None,
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl Config {
    /// Safe summary for logging: never exposes the key itself
    pub fn get_safe_summary(&self) -> SafeSummary {
        SafeSummary {
            api_key_configured: self.api_key.as_deref().is_some_and(|k| !k.is_empty()),
            model: self.model.clone(),
            data_dir: self.data_dir.clone(),
        }
    }
}

#[derive(Debug)]
pub struct SafeSummary {
    pub api_key_configured: bool,
    pub model: Option<String>,
    pub data_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.model, Some(DEFAULT_MODEL.to_string()));
        assert_eq!(config.base_url, Some(DEFAULT_BASE_URL.to_string()));
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_config_serialization_skips_none() {
        let config = Config {
            api_key: Some("test-key".to_string()),
            base_url: None,
            model: Some("test-model".to_string()),
            data_dir: None,
            timeout_seconds: None,
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("test-key"));
        assert!(json.contains("test-model"));
        assert!(!json.contains("data_dir"));
    }

    #[test]
    fn test_config_deserialization() {
        let json = r#"{
            "api_key": "my-api-key",
            "model": "custom-model",
            "data_dir": "/tmp/wingmate"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.api_key, Some("my-api-key".to_string()));
        assert_eq!(config.model, Some("custom-model".to_string()));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/wingmate")));
    }

    #[test]
    fn test_safe_summary_hides_key() {
        let config = Config {
            api_key: Some("secret".to_string()),
            ..Config::default()
        };
        let summary = config.get_safe_summary();
        assert!(summary.api_key_configured);
        assert!(!format!("{:?}", summary).contains("secret"));
    }
}
