//! Centralized error types and conversions for wingmate
//!
//! Structured error types using `thiserror` for library code.
//! CLI/main modules should use `anyhow` for easy context.

use std::path::PathBuf;
use thiserror::Error;

/// Global error type for wingmate operations
#[derive(Error, Debug)]
pub enum WingmateError {
    /// IO errors with path context
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Conversation persistence failures
    #[error("Conversation persistence failed for {conversation_id}: {message}")]
    ConversationPersistence {
        conversation_id: String,
        message: String,
    },

    /// A chat turn was appended with a role other than user/assistant
    #[error("Invalid chat role: {role}")]
    InvalidRole { role: String },

    /// A chat turn was appended with empty content
    #[error("Chat turn content must not be empty")]
    EmptyContent,

    /// A progress update would leave a goal with negative progress
    #[error("Invalid goal progress: {message}")]
    InvalidProgress { message: String },

    /// Requested goal does not exist or belongs to another user
    #[error("Goal not found: {goal_id}")]
    GoalNotFound { goal_id: i64 },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// External service errors (agent backend)
    #[error("External service error ({service}): {message}")]
    ExternalService { service: String, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl WingmateError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a conversation persistence error
    pub fn conversation_persistence(
        conversation_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ConversationPersistence {
            conversation_id: conversation_id.into(),
            message: message.into(),
        }
    }

    /// Create an invalid role error
    pub fn invalid_role(role: impl Into<String>) -> Self {
        Self::InvalidRole { role: role.into() }
    }

    /// Create an invalid progress error
    pub fn invalid_progress(message: impl Into<String>) -> Self {
        Self::InvalidProgress {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an external service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns true if this error is recoverable (the caller can retry or fix input)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // IO and persistence errors might be transient
            WingmateError::Io { .. } => true,
            WingmateError::ConversationPersistence { .. } => true,
            // Validation errors are recoverable (the user can fix the input)
            WingmateError::InvalidRole { .. } => true,
            WingmateError::EmptyContent => true,
            WingmateError::InvalidProgress { .. } => true,
            WingmateError::GoalNotFound { .. } => true,
            // External service errors are typically transient network issues
            WingmateError::ExternalService { .. } => true,
            // Serialization errors usually indicate data corruption
            WingmateError::Serialization { .. } => false,
            // Config errors are typically fatal on startup
            WingmateError::Config { .. } => false,
        }
    }

    /// Returns the error severity level for logging
    pub fn severity(&self) -> tracing::Level {
        match self {
            WingmateError::Config { .. } => tracing::Level::ERROR,
            WingmateError::Serialization { .. } => tracing::Level::ERROR,
            WingmateError::ExternalService { .. } => tracing::Level::WARN,
            WingmateError::ConversationPersistence { .. } => tracing::Level::WARN,
            WingmateError::Io { .. } => tracing::Level::WARN,
            WingmateError::InvalidRole { .. } => tracing::Level::INFO,
            WingmateError::EmptyContent => tracing::Level::INFO,
            WingmateError::InvalidProgress { .. } => tracing::Level::INFO,
            WingmateError::GoalNotFound { .. } => tracing::Level::INFO,
        }
    }

    /// Returns true for pure input-validation failures (mapped to 4xx by callers)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WingmateError::InvalidRole { .. }
                | WingmateError::EmptyContent
                | WingmateError::InvalidProgress { .. }
        )
    }
}

/// Result type alias using WingmateError
pub type Result<T> = std::result::Result<T, WingmateError>;

// Automatic error conversions for seamless ? operator usage

impl From<std::io::Error> for WingmateError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for WingmateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for WingmateError {
    fn from(err: reqwest::Error) -> Self {
        Self::ExternalService {
            service: "agent".to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_recoverable() {
        assert!(WingmateError::invalid_role("system").is_recoverable());
        assert!(WingmateError::EmptyContent.is_recoverable());
        assert!(WingmateError::invalid_progress("would be negative").is_recoverable());
    }

    #[test]
    fn test_validation_classification() {
        assert!(WingmateError::invalid_role("tool").is_validation());
        assert!(WingmateError::EmptyContent.is_validation());
        assert!(WingmateError::invalid_progress("negative").is_validation());
        assert!(!WingmateError::config("missing key").is_validation());
        assert!(!WingmateError::external_service("agent", "timeout").is_validation());
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = WingmateError::io("/test/path", io_err);
        assert!(err.to_string().contains("/test/path"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_config_error_not_recoverable() {
        let err = WingmateError::config("missing api key");
        assert!(!err.is_recoverable());
        assert_eq!(err.severity(), tracing::Level::ERROR);
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(
            WingmateError::invalid_role("x").severity(),
            tracing::Level::INFO
        );
        assert_eq!(
            WingmateError::external_service("agent", "down").severity(),
            tracing::Level::WARN
        );
    }

    #[test]
    fn test_error_conversions() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let converted: WingmateError = io_err.into();
        assert!(matches!(converted, WingmateError::Io { .. }));

        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let converted: WingmateError = json_err.into();
        assert!(matches!(converted, WingmateError::Serialization { .. }));
    }

    #[test]
    fn test_goal_not_found_display() {
        let err = WingmateError::GoalNotFound { goal_id: 42 };
        assert!(err.to_string().contains("42"));
    }
}
