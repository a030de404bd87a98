//! Unified error types for repo-pulse.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for repo-pulse.
#[derive(Debug, Error)]
pub enum Error {
    /// Remote count failed after all retries. Fatal; aborts the run so no
    /// half-computed row is ever persisted.
    #[error("fetch exhausted after {attempts} attempts: {query}")]
    FetchExhausted { query: String, attempts: u32 },

    /// The target table cannot be read or written. Raised before any remote
    /// calls are made, to avoid wasted quota.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Non-transient HTTP failure (e.g. a 422 on a malformed query).
    #[error("http error: {0}")]
    Http(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a fetch-exhaustion error.
    pub fn fetch_exhausted(query: impl Into<String>, attempts: u32) -> Self {
        Self::FetchExhausted {
            query: query.into(),
            attempts,
        }
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
