//! Destination naming.

use chrono::{DateTime, Utc};
use mbtc_core::{ApiKind, Coin};
use std::path::PathBuf;

/// Capture-time format used in file names and object keys.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Where one writer persists its records.
///
/// Fixed at writer construction; a new writer always gets a new capture
/// timestamp and therefore a new destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    api: ApiKind,
    coin: Coin,
    captured_at: DateTime<Utc>,
}

impl Destination {
    pub fn new(api: ApiKind, coin: Coin, captured_at: DateTime<Utc>) -> Self {
        Self {
            api,
            coin,
            captured_at,
        }
    }

    /// Destination captured now.
    pub fn now(api: ApiKind, coin: Coin) -> Self {
        Self::new(api, coin, Utc::now())
    }

    pub fn api(&self) -> ApiKind {
        self.api
    }

    pub fn coin(&self) -> &Coin {
        &self.coin
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    fn timestamp(&self) -> String {
        self.captured_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Relative file path: `{api}/{coin}/{timestamp}.json`.
    pub fn local_path(&self) -> PathBuf {
        PathBuf::from(self.api.as_str())
            .join(self.coin.as_str())
            .join(format!("{}.json", self.timestamp()))
    }

    /// Object key, partitioned by coin and extraction date.
    ///
    /// `mercado_bitcoin/{api}/coin={coin}/extracted_at={date}/{api}_{coin}_{timestamp}.json`
    pub fn object_key(&self) -> String {
        format!(
            "mercado_bitcoin/{api}/coin={coin}/extracted_at={date}/{api}_{coin}_{ts}.json",
            api = self.api,
            coin = self.coin,
            date = self.captured_at.format("%Y-%m-%d"),
            ts = self.timestamp(),
        )
    }
}
