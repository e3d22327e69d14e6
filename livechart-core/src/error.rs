//! Error taxonomy for fetch attempts

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal outcome of a single fetch attempt
///
/// Each variant ends that attempt only; the next scheduled refresh tick is
/// the retry. Cloneable because failed states are published through watch
/// channels.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchError {
    /// Request never reached the backend or the connection dropped
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("Server error (status {status})")]
    Server { status: u16 },

    /// Request exceeded the client timeout
    #[error("Request timed out")]
    Timeout,

    /// Response is missing or violating required fields for the query's market type
    #[error("Schema mismatch: {0}")]
    Schema(String),
}

impl FetchError {
    pub fn network(msg: impl Into<String>) -> Self {
        FetchError::Network(msg.into())
    }

    pub fn server(status: u16) -> Self {
        FetchError::Server { status }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        FetchError::Schema(msg.into())
    }
}

/// Result type alias for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;
