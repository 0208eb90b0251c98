//! Persistence error types.

use crate::object_store::ObjectStoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data type {shape} is not supported for ingestion")]
    UnsupportedDataType { shape: &'static str },

    #[error("Commit of {key} failed: {source}")]
    Commit {
        key: String,
        #[source]
        source: ObjectStoreError,
    },
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
