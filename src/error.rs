//! Error types.

use thiserror::Error;

/// Errors raised while loading or validating a [`TurtleConfig`](crate::TurtleConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

/// A raw discrete action index outside `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid discrete action {0}: expected 0 (noop), 1 (forward), 2 (left) or 3 (right)")]
pub struct InvalidAction(pub i64);
