//! Mercado Bitcoin market data ingestor.
//!
//! Thin orchestration around the API client and the writers:
//! - Configuration (coins, APIs, storage backend)
//! - Per-API checkpoints (next day to fetch)
//! - Day-by-day ingestion from the checkpoint up to today

pub mod app;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod ingestor;

pub use app::Application;
pub use checkpoint::CheckpointStore;
pub use config::AppConfig;
pub use error::{IngestError, IngestResult};
pub use ingestor::{IngestSummary, Ingestor};
