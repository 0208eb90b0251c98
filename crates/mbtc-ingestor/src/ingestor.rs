//! Day-by-day ingestion.
//!
//! For one API, walks from the checkpoint (or the configured start date) up
//! to, but excluding, `today`. Each day is one period: every coin is fetched
//! and written through a fresh writer, then the checkpoint moves to the next
//! day. The first failure stops the walk and leaves the checkpoint on the
//! failed day.

use crate::checkpoint::CheckpointStore;
use crate::error::{IngestError, IngestResult};
use chrono::NaiveDate;
use mbtc_api::{ApiClient, ApiResource, DaySummaryApi, TradesApi};
use mbtc_core::{ApiKind, Coin, TradeRange};
use mbtc_persistence::WriterFactory;
use tracing::{info, warn};

/// Outcome of one `ingest` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub api: ApiKind,
    /// Days fully ingested.
    pub periods: usize,
    /// Lines persisted across all coins and days.
    pub records: usize,
    /// Next day to fetch.
    pub next_date: NaiveDate,
}

/// Orchestrates API client, writers and checkpoints.
pub struct Ingestor {
    client: ApiClient,
    writers: WriterFactory,
    checkpoints: CheckpointStore,
    coins: Vec<Coin>,
    default_start_date: NaiveDate,
    max_periods: Option<usize>,
}

impl Ingestor {
    pub fn new(
        client: ApiClient,
        writers: WriterFactory,
        checkpoints: CheckpointStore,
        coins: Vec<Coin>,
        default_start_date: NaiveDate,
    ) -> Self {
        Self {
            client,
            writers,
            checkpoints,
            coins,
            default_start_date,
            max_periods: None,
        }
    }

    /// Stop after `max` days per call.
    pub fn with_max_periods(mut self, max: Option<usize>) -> Self {
        self.max_periods = max;
        self
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    /// Ingest every pending day of `api` before `today`.
    pub async fn ingest(&self, api: ApiKind, today: NaiveDate) -> IngestResult<IngestSummary> {
        let mut date = self
            .checkpoints
            .load(api)?
            .unwrap_or(self.default_start_date);

        let mut summary = IngestSummary {
            api,
            periods: 0,
            records: 0,
            next_date: date,
        };

        while date < today {
            if self.max_periods.is_some_and(|max| summary.periods >= max) {
                info!(api = %api, next = %date, "Period limit reached");
                break;
            }

            let records = match self.ingest_period(api, date).await {
                Ok(records) => records,
                Err(e) => {
                    warn!(api = %api, date = %date, error = %e, "Ingestion stopped");
                    return Err(e);
                }
            };

            date = date
                .succ_opt()
                .ok_or_else(|| IngestError::Checkpoint(format!("no day after {date}")))?;
            self.checkpoints.save(api, date)?;

            summary.periods += 1;
            summary.records += records;
            summary.next_date = date;
        }

        info!(
            api = %api,
            periods = summary.periods,
            records = summary.records,
            next = %summary.next_date,
            "Ingestion complete"
        );
        Ok(summary)
    }

    /// Fetch and persist one day for every coin.
    pub async fn ingest_period(&self, api: ApiKind, date: NaiveDate) -> IngestResult<usize> {
        match api {
            ApiKind::DaySummary => self.ingest_resource(&DaySummaryApi::new(date)).await,
            ApiKind::Trades => {
                self.ingest_resource(&TradesApi::new(TradeRange::for_day(date)))
                    .await
            }
        }
    }

    async fn ingest_resource<R: ApiResource + Sync>(&self, resource: &R) -> IngestResult<usize> {
        let mut records = 0;
        for coin in &self.coins {
            let data = self.client.get_data(coin, resource).await?;
            let mut writer = self.writers.create(R::KIND, coin)?;
            records += writer.write(&data).await?;
        }
        Ok(records)
    }
}
