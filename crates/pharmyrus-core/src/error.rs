//! Error types for pharmyrus.

use thiserror::Error;

/// Result type alias using pharmyrus's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for pharmyrus operations.
///
/// Fetch-layer failures (`Timeout`, `RetriesExhausted`, `QuotaExceeded`,
/// `PoolExhausted`) are recovered inside the fetcher or at the strategy
/// boundary and never surface past a strategy. The only error a caller of
/// the pipeline sees is `InvalidInput`.
#[derive(Error, Debug)]
pub enum Error {
    /// Outbound call exceeded its hard per-call timeout
    #[error("Fetch timed out after {0}s")]
    Timeout(u64),

    /// Retry budget exhausted; carries the last underlying cause
    #[error("Retries exhausted: {0}")]
    RetriesExhausted(String),

    /// Credential-gated target reported quota exhaustion
    #[error("Quota exceeded for credential")]
    QuotaExceeded,

    /// Every credential in the rotation pool is cooling down
    #[error("API key pool exhausted")]
    PoolExhausted,

    /// Malformed caller input (empty molecule name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Response body could not be parsed into the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Upstream returned a non-success HTTP status
    #[error("Upstream status {0}")]
    Status(u16),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for faults the fetcher may retry: timeouts, connection-level
    /// failures, rate limiting (429), and server errors (5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Timeout(_) | Error::Request(_) => true,
            Error::Status(code) => *code == 429 || (500..=599).contains(code),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            // reqwest does not expose the configured timeout on the error
            Error::Timeout(0)
        } else {
            Error::Request(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
