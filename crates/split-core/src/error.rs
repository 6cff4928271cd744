//! # Payment Error Types
//!
//! Typed error handling for the split-pay handlers.
//! All processor and handler operations return `Result<T, PaymentError>`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller identity missing on an operation that requires it
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Request payload rejected before any upstream call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure kind reported to callers.
///
/// Everything that is not the caller's fault collapses into `Internal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Unauthenticated,
    InvalidArgument,
    Internal,
}

impl ErrorKind {
    /// Wire status string (`UNAUTHENTICATED`, `INVALID_ARGUMENT`, `INTERNAL`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::Internal => "INTERNAL",
        }
    }

    /// Returns the HTTP status code appropriate for this kind
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Unauthenticated => 401,
            ErrorKind::InvalidArgument => 400,
            ErrorKind::Internal => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PaymentError {
    /// Classify this error for the caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            PaymentError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            PaymentError::Configuration(_)
            | PaymentError::ProviderError { .. }
            | PaymentError::NetworkError(_)
            | PaymentError::Serialization(_)
            | PaymentError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The bare message, without the variant prefix.
    ///
    /// For provider errors this is the upstream message as the processor wrote it.
    pub fn message(&self) -> &str {
        match self {
            PaymentError::Configuration(m)
            | PaymentError::Unauthenticated(m)
            | PaymentError::InvalidArgument(m)
            | PaymentError::NetworkError(m)
            | PaymentError::Serialization(m)
            | PaymentError::Internal(m) => m,
            PaymentError::ProviderError { message, .. } => message,
        }
    }

    /// True for failures that happened talking to the processor
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            PaymentError::ProviderError { .. }
                | PaymentError::NetworkError(_)
                | PaymentError::Serialization(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
