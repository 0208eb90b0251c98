//! Ingestor error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(#[from] mbtc_api::ApiError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] mbtc_persistence::PersistenceError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] mbtc_telemetry::TelemetryError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type IngestResult<T> = Result<T, IngestError>;
