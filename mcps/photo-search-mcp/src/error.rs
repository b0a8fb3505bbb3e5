//! Error types for feed fetches and history persistence

use thiserror::Error;

/// Errors that can occur when fetching from the photo feed
#[derive(Error, Debug)]
pub enum FeedError {
    /// The search tag was empty after trimming
    #[error("search tag must not be empty")]
    InvalidQuery,

    /// The request failed in transport or returned a non-success status
    #[error("feed request failed{}: {cause}", status_suffix(.status))]
    FetchFailed {
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Underlying cause
        cause: String,
    },

    /// No response within the fetch window
    #[error("feed request timed out")]
    Timeout,
}

impl FeedError {
    /// Transport failure without a response status
    pub fn transport(cause: impl Into<String>) -> Self {
        FeedError::FetchFailed {
            status: None,
            cause: cause.into(),
        }
    }

    /// Short name of the failure kind, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::InvalidQuery => "invalid_query",
            FeedError::FetchFailed { .. } => "fetch_failed",
            FeedError::Timeout => "timeout",
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return FeedError::Timeout;
        }
        FeedError::FetchFailed {
            status: err.status().map(|s| s.as_u16()),
            cause: err.to_string(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

/// Result type alias for feed operations
pub type FeedResult<T> = Result<T, FeedError>;

/// Errors from the key-value slot backing the search history
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the slot failed
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// The history could not be encoded
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
