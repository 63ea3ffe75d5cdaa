//! Error types with caller location tracking.
//!
//! These only travel inside a module boundary or out through the binary. The
//! router and the game engine turn them into banners before they reach a
//! caller.

use derive_more::{Display, Error};
use tracing::instrument;

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Durable credential storage error.
#[derive(Debug, Clone, Display, Error)]
#[display("Storage error: {} at {}:{}", message, file, line)]
pub struct StorageError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StorageError {
    /// Creates a new storage error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for StorageError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<toml::de::Error> for StorageError {
    #[track_caller]
    fn from(err: toml::de::Error) -> Self {
        Self::new(format!("Malformed storage file: {}", err))
    }
}

impl From<toml::ser::Error> for StorageError {
    #[track_caller]
    fn from(err: toml::ser::Error) -> Self {
        Self::new(format!("Failed to encode storage file: {}", err))
    }
}

/// Category of an API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ApiErrorKind {
    /// Network unreachable or non-2xx status.
    #[display("transport")]
    Transport,
    /// The server answered `success: false`.
    #[display("rejected")]
    Rejected,
    /// The envelope or its `data` did not have the expected shape.
    #[display("decode")]
    Decode,
}

/// API error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("API error ({}): {} at {}:{}", kind, message, file, line)]
pub struct ApiError {
    /// Failure category.
    pub kind: ApiErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ApiError {
    /// Creates a new API error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(ApiErrorKind::Transport, format!("HTTP error: {}", err))
    }
}

impl From<serde_json::Error> for ApiError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(ApiErrorKind::Decode, format!("JSON error: {}", err))
    }
}

/// Route table error.
#[derive(Debug, Clone, Display, Error)]
#[display("Router error: {} at {}:{}", message, file, line)]
pub struct RouterError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl RouterError {
    /// Creates a new router error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<regex::Error> for RouterError {
    #[track_caller]
    fn from(err: regex::Error) -> Self {
        Self::new(format!("Invalid URL pattern: {}", err))
    }
}
