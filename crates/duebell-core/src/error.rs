//! Core error types for duebell-core.
//!
//! One umbrella enum with per-concern sub-enums, following the
//! row-level / transport-level / infrastructure split: row-level data
//! problems never surface here (they are logged and skipped inside the
//! evaluator), transport errors are recovered by the job loop, and
//! everything else aborts the pass.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for duebell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Status-store errors
    #[error("Status store error: {0}")]
    Store(#[from] StoreError),

    /// Spreadsheet-source errors (including credential resolution)
    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),

    /// Notification-transport errors
    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),
}

/// Status-store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the store
    #[error("Failed to open status store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The configured table name is not a plain identifier
    #[error("Invalid status table name: '{0}' (expected [A-Za-z0-9_]+)")]
    InvalidTable(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another process
    #[error("Status store is locked")]
    Locked,

    /// A persisted status value was not Active/Handled
    #[error("Unknown status value '{value}' for item '{item_id}'")]
    UnknownStatus { item_id: String, value: String },
}

/// Spreadsheet-source errors. Credential resolution happens inside the
/// sheet client, so a secrets failure surfaces here too.
#[derive(Error, Debug)]
pub enum SheetError {
    /// Credential bundle could not be fetched or parsed
    #[error("Sheet credentials unavailable: {0}")]
    Credentials(String),

    /// HTTP-level failure talking to the sheet API
    #[error("Sheet request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The sheet API returned an error payload
    #[error("Sheet API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape
    #[error("Malformed sheet response: {0}")]
    MalformedResponse(String),
}

/// Notification-transport errors. Always recovered by the job loop.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// HTTP-level failure
    #[error("{channel} request failed: {source}")]
    Http {
        channel: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The transport API rejected the send
    #[error("{channel} API error (HTTP {status}): {message}")]
    Api {
        channel: &'static str,
        status: u16,
        message: String,
    },

    /// The channel is missing required settings
    #[error("{channel} transport not configured: {message}")]
    NotConfigured {
        channel: &'static str,
        message: String,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
