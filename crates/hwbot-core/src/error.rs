//! Error types for the homework status bot
//!
//! This module defines all error types used throughout the crate, plus the
//! [`ErrorKind`] classification the engine uses to pick a reporting policy.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the homework status bot
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration (fatal, pre-loop)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Status source transport/HTTP failure
    #[error("{0}")]
    Source(#[from] SourceError),

    /// The API response violates the expected shape
    #[error("Malformed response: {0}")]
    Shape(String),

    /// The API reported a status code missing from the catalog
    #[error("Unknown homework status: {0}")]
    UnknownStatus(String),

    /// Notification delivery failed
    #[error("Notification delivery failed: {0}")]
    Notify(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a source error
    pub fn source_failure(reason: SourceErrorReason, detail: impl Into<String>) -> Self {
        Self::Source(SourceError::new(reason, detail))
    }

    /// Create a shape error
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    /// Create an unknown-status error carrying the unrecognized code
    pub fn unknown_status(code: impl Into<String>) -> Self {
        Self::UnknownStatus(code.into())
    }

    /// Create a notification error
    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }

    /// Classify this error for the engine's reporting policy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Source(_) => ErrorKind::Source,
            Error::Shape(_) => ErrorKind::Shape,
            Error::UnknownStatus(_) => ErrorKind::UnknownStatus,
            Error::Notify(_) => ErrorKind::Notify,
            Error::Json(_) | Error::Other(_) => ErrorKind::Unexpected,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Why a status source fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorReason {
    /// The endpoint rejected the credential (401)
    AuthorizationRejected,
    /// Any other non-200 status
    UnexpectedStatus,
    /// No route to the host / connection refused
    Connectivity,
    /// The request timed out
    Timeout,
    /// Any other transport-level fault
    Transport,
}

impl fmt::Display for SourceErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SourceErrorReason::AuthorizationRejected => "authorization rejected",
            SourceErrorReason::UnexpectedStatus => "unexpected status",
            SourceErrorReason::Connectivity => "connectivity",
            SourceErrorReason::Timeout => "timeout",
            SourceErrorReason::Transport => "transport",
        };
        f.write_str(text)
    }
}

/// A classified status source failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}: {detail}")]
pub struct SourceError {
    /// Failure class
    pub reason: SourceErrorReason,
    /// Diagnostic detail (status code, server message, transport cause)
    pub detail: String,
}

impl SourceError {
    /// Create a new source error
    pub fn new(reason: SourceErrorReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

/// Error classes as seen by the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Fatal configuration failure
    Config,
    /// Status source failure (suppressible)
    Source,
    /// Malformed response
    Shape,
    /// Unrecognized status code
    UnknownStatus,
    /// Notification channel failure (never re-notified)
    Notify,
    /// Anything else
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::Config => "config",
            ErrorKind::Source => "source",
            ErrorKind::Shape => "shape",
            ErrorKind::UnknownStatus => "unknown_status",
            ErrorKind::Notify => "notify",
            ErrorKind::Unexpected => "unexpected",
        };
        f.write_str(text)
    }
}
