use http::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::AcquireError;

/// Result type alias for filter operations
pub type Result<T, E = FilterError> = std::result::Result<T, E>;

/// Metadata or filter config text that could not be turned into filters.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing {key} in filter entry {index}")]
    MissingKey { key: &'static str, index: usize },

    #[error("expected {expected} at {path}")]
    UnexpectedType { path: String, expected: &'static str },

    #[error("nothing at {path}")]
    MissingPath { path: String },

    #[error("index {index} out of bounds at {path}")]
    IndexOutOfBounds { path: String, index: usize },
}

/// Failures talking to the dashboard API.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("{status} response returned: {body}")]
    Status { status: StatusCode, body: String },

    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            RemoteError::Transport(e) => e.status(),
            RemoteError::InvalidUrl(_) => None,
        }
    }
}

/// Errors surfaced by the upsert engine and the resource lifecycle.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("upsert lock closed")]
    LockClosed(#[from] AcquireError),
}

impl FilterError {
    /// Short label used to tag failure metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FilterError::Remote(_) => "remote",
            FilterError::Decode(_) => "decode",
            FilterError::Timeout(_) => "timeout",
            FilterError::LockClosed(_) => "lock_closed",
        }
    }
}
