//! Error types for the session crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ApiError`: failures talking to the REST API
//! - `ConfigError`: invalid client configuration
//!
//! Session operations never surface these to callers directly. Probe and
//! refresh failures become an absent identity, login and register failures
//! become an [`AuthOutcome::Failure`](crate::AuthOutcome::Failure).

use std::fmt;

/// Errors from REST API calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    Transport { details: String },
    /// The request did not complete within the configured timeout.
    Timeout { operation: String },
    /// The request was abandoned because the session was shut down.
    Cancelled { operation: String },
    /// The server answered 401 on a protected resource.
    Unauthorized { path: String },
    /// The server answered with a non-success status.
    Status {
        path: String,
        status: u16,
        message: String,
    },
    /// A request or response body did not match the expected shape.
    Decode { details: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { details } => {
                write!(f, "transport error: {details}")
            }
            Self::Timeout { operation } => {
                write!(f, "{operation} timed out")
            }
            Self::Cancelled { operation } => {
                write!(f, "{operation} was cancelled")
            }
            Self::Unauthorized { path } => {
                write!(f, "unauthorized request to {path}")
            }
            Self::Status {
                path,
                status,
                message,
            } => {
                if message.is_empty() {
                    write!(f, "{path} returned status {status}")
                } else {
                    write!(f, "{path} returned status {status}: {message}")
                }
            }
            Self::Decode { details } => {
                write!(f, "invalid body: {details}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                operation: err
                    .url()
                    .map_or_else(|| "request".to_string(), |url| url.path().to_string()),
            }
        } else {
            Self::Transport {
                details: err.to_string(),
            }
        }
    }
}

/// Errors from loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration sources could not be read or deserialized.
    Load { details: String },
    /// A configuration value is not usable.
    Invalid { field: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { details } => {
                write!(f, "failed to load configuration: {details}")
            }
            Self::Invalid { field, reason } => {
                write!(f, "invalid configuration for '{field}': {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
