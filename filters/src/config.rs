use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("HTTP timeout cannot be 0")]
    InvalidTimeout,

    #[error("Lock timeout cannot be 0")]
    InvalidLockTimeout,

    #[error("Unsupported base URL scheme: {0}")]
    UnsupportedScheme(String),
}

fn default_timeout_secs() -> u64 {
    30
}

/// Dashboard API connection settings
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Workspace URL, e.g. "https://1234abcd.us1a.app.preset.io"
    pub base_url: Url,
    /// Pre-acquired bearer token. Acquiring tokens is left to the caller.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Applies to every request/response cycle
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        match self.base_url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ValidationError::UnsupportedScheme(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct UpsertConfig {
    /// Upper bound for one upsert, covering both waiting for the lock and the
    /// remote round trips. No bound when unset.
    pub lock_timeout_secs: Option<u64>,
}

impl UpsertConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.lock_timeout_secs == Some(0) {
            return Err(ValidationError::InvalidLockTimeout);
        }
        Ok(())
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.lock_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub upsert: UpsertConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.api.validate()?;
        self.upsert.validate()?;
        Ok(())
    }
}
