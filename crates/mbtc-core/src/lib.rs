//! Core domain types for the Mercado Bitcoin ingestor.
//!
//! This crate provides the types shared by the API client, the writers and
//! the orchestrator:
//! - `Coin`: Validated coin symbol (e.g., "BTC")
//! - `ApiKind`: Which public API resource is being ingested
//! - `TradeRange`: Optional, ordered time bounds for trade queries
//! - `Record`: One JSON object returned by the API

pub mod error;
pub mod market;
pub mod range;

pub use error::{CoreError, Result};
pub use market::{ApiKind, Coin, Record};
pub use range::{unix_epoch, TradeRange};
