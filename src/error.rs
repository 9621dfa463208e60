//! Error types for the auto typer.
//!
//! Every failure the typing pipeline can hit is a variant of [`TyperError`].
//! Keystroke backends report failures as the narrower [`InjectionError`],
//! which the dispatcher treats as a signal to abort the run.

use std::io;
use thiserror::Error;

/// Main error type for auto typer operations.
#[derive(Error, Debug)]
pub enum TyperError {
    /// A numeric setting could not be parsed.
    #[error("invalid {field} '{value}': {reason}")]
    Parse {
        field: String,
        value: String,
        reason: String,
    },

    /// Typing was requested for text that is empty or only whitespace.
    #[error("nothing to type: input is empty or whitespace only")]
    EmptyInput,

    /// The keystroke backend failed to deliver a key or character.
    #[error(transparent)]
    Injection(#[from] InjectionError),

    /// A typing job is still running.
    #[error("a typing job is already running; stop it before starting another")]
    AlreadyRunning,

    /// `run` was called without a job being armed first.
    #[error("no typing job has been started")]
    NotArmed,

    /// Configuration validation error.
    #[error("configuration error: {0}")]
    ConfigValidation(String),

    /// Error reading or parsing configuration file.
    #[error("failed to load config from '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },

    /// Error writing configuration file.
    #[error("failed to save config to '{path}': {reason}")]
    ConfigSave { path: String, reason: String },

    /// Error parsing duration string.
    #[error("invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    /// Error registering or handling the stop hotkey.
    #[error("hotkey error: {0}")]
    Hotkey(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for auto typer operations.
pub type Result<T> = std::result::Result<T, TyperError>;

/// A keystroke backend failed to perform one injection action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to {action}: {reason}")]
pub struct InjectionError {
    pub action: String,
    pub reason: String,
}

impl InjectionError {
    pub fn new(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            reason: reason.into(),
        }
    }
}

impl TyperError {
    /// Create a new Parse error.
    pub fn parse(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Parse {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new ConfigValidation error.
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation(message.into())
    }

    /// Create a new ConfigLoad error.
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new ConfigSave error.
    pub fn config_save(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigSave {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InvalidDuration error.
    pub fn invalid_duration(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDuration {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Hotkey error.
    pub fn hotkey(message: impl Into<String>) -> Self {
        Self::Hotkey(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TyperError::parse("delay", "soon", "not a number");
        assert_eq!(err.to_string(), "invalid delay 'soon': not a number");

        let err = TyperError::EmptyInput;
        assert_eq!(
            err.to_string(),
            "nothing to type: input is empty or whitespace only"
        );

        let err = TyperError::config_validation("tick_interval must be greater than zero");
        assert_eq!(
            err.to_string(),
            "configuration error: tick_interval must be greater than zero"
        );
    }

    #[test]
    fn test_injection_error_is_transparent() {
        let err: TyperError = InjectionError::new("press 'enter'", "display closed").into();
        assert!(matches!(err, TyperError::Injection(_)));
        assert_eq!(err.to_string(), "failed to press 'enter': display closed");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: TyperError = io_err.into();
        assert!(matches!(err, TyperError::Io(_)));
    }
}
