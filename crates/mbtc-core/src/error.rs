//! Error types for mbtc-core.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Core error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid coin: {0:?}")]
    InvalidCoin(String),

    #[error("Invalid range: from {from} is after to {to}")]
    InvalidRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    #[error("Unknown API kind: {0}")]
    UnknownApi(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
