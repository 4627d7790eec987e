//! Error types for the application

use thiserror::Error;

/// Result type alias using our DcaError
pub type Result<T> = std::result::Result<T, DcaError>;

/// Main error type for exchange and execution operations
#[derive(Error, Debug)]
pub enum DcaError {
    /// Invalid credentials, bad signature or rejected nonce.
    /// Systemic: no authenticated call in the run can succeed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Price lookup failed (unknown pair, ticker unreachable)
    #[error("Market data error for {pair}: {message}")]
    MarketData {
        pair: String,
        message: String,
        retryable: bool,
    },

    /// Network failure, timeout, 5xx or rate limit
    #[error("Transient error: {0}")]
    Transient(String),

    /// The exchange refused the order itself (minimum size, pair suspended, ...)
    #[error("Order rejected by exchange: {0}")]
    ExchangeRejection(String),

    /// Fiat to volume conversion failed
    #[error("Calculation error: {0}")]
    Calculation(String),

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notification(String),

    /// Response body is not the expected JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DcaError {
    /// Whether another attempt of the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            DcaError::Transient(_) => true,
            DcaError::MarketData { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Whether the failure affects every remaining strategy of the run
    pub fn is_systemic(&self) -> bool {
        matches!(self, DcaError::Auth(_))
    }
}
