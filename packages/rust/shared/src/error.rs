//! Error types for unifind.
//!
//! Library crates use [`UnifindError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all unifind operations.
#[derive(Debug, thiserror::Error)]
pub enum UnifindError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error (connect, timeout, non-2xx status, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The Maps API answered, but with a non-OK status.
    #[error("maps api returned {status}: {message}")]
    Api { status: String, message: String },

    /// Response body could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input or configuration value out of range.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, UnifindError>;

impl UnifindError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an API status error. An empty message falls back to the status.
    pub fn api(status: impl Into<String>, message: Option<String>) -> Self {
        let status = status.into();
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "no error_message in response".into());
        Self::Api { status, message }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
