//! Application wiring.
//!
//! Builds the components from configuration:
//! - HTTP transport and API client
//! - Writer factory for the configured storage backend
//! - Checkpoint store

use crate::checkpoint::CheckpointStore;
use crate::config::AppConfig;
use crate::error::IngestResult;
use crate::ingestor::{IngestSummary, Ingestor};
use chrono::NaiveDate;
use mbtc_api::{ApiClient, ApiError, DynHttpTransport, ReqwestTransport};
use mbtc_persistence::{HttpObjectStore, StorageBackend, WriterFactory};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Main application.
pub struct Application {
    config: AppConfig,
    ingestor: Ingestor,
}

impl Application {
    /// Create the application with the real HTTP transport.
    pub fn new(config: AppConfig) -> IngestResult<Self> {
        let transport: DynHttpTransport = Arc::new(ReqwestTransport::with_timeout(
            Duration::from_millis(config.api.timeout_ms),
        )
        .map_err(ApiError::from)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Create the application over an explicit transport. The object-store
    /// backend shares it with the API client.
    pub fn with_transport(config: AppConfig, transport: DynHttpTransport) -> Self {
        let client = ApiClient::new(transport.clone(), config.api.base_url.as_str());

        let writers = match config.storage.backend {
            StorageBackend::Local => WriterFactory::local(&config.storage.root_dir),
            StorageBackend::ObjectStore => WriterFactory::object_store(
                Arc::new(HttpObjectStore::new(transport, config.storage.endpoint.as_str())),
                config.storage.bucket.as_str(),
            ),
        };

        let checkpoints = CheckpointStore::new(&config.checkpoint.dir);

        info!(
            base_url = %client.base_url(),
            backend = ?writers.backend(),
            coins = config.coins.len(),
            "Application initialized"
        );

        let ingestor = Ingestor::new(
            client,
            writers,
            checkpoints,
            config.coins.clone(),
            config.default_start_date,
        )
        .with_max_periods(config.max_periods);

        Self { config, ingestor }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Ingest every configured API once, in order, up to `today`.
    pub async fn run_once(&self, today: NaiveDate) -> IngestResult<Vec<IngestSummary>> {
        let mut summaries = Vec::with_capacity(self.config.apis.len());
        for api in &self.config.apis {
            summaries.push(self.ingestor.ingest(*api, today).await?);
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use mbtc_api::MockTransport;
    use mbtc_core::ApiKind;
    use mbtc_persistence::PersistenceError;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_run_once_local_backend() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = AppConfig::from_toml(
            r#"
            coins = ["BTC"]
            default_start_date = "2021-06-01"
            apis = ["day-summary", "trades"]

            [api]
            base_url = "https://api.example.test/"
            "#,
        )
        .unwrap();
        config.storage.root_dir = temp_dir.path().join("data");
        config.checkpoint.dir = temp_dir.path().join("checkpoints");

        let mock = Arc::new(MockTransport::new());
        mock.respond(
            "https://api.example.test/BTC/day-summary/2021/6/1",
            200,
            r#"{"date":"2021-06-01","opening":152700.0}"#,
        );
        mock.respond(
            "https://api.example.test/BTC/trades/1622505600/1622592000",
            200,
            r#"[{"tid":1},{"tid":2}]"#,
        );

        let app = Application::with_transport(config, mock.clone());
        let summaries = app.run_once(day(2021, 6, 2)).await.unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].api, ApiKind::DaySummary);
        assert_eq!(summaries[0].records, 1);
        assert_eq!(summaries[1].api, ApiKind::Trades);
        assert_eq!(summaries[1].records, 2);
        assert!(temp_dir.path().join("data/day-summary/BTC").is_dir());
        assert!(temp_dir.path().join("data/trades/BTC").is_dir());
    }

    #[tokio::test]
    async fn test_run_once_object_store_upload_failure() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = AppConfig::from_toml(
            r#"
            coins = ["ETH"]
            default_start_date = "2021-06-01"

            [api]
            base_url = "https://api.example.test"

            [storage]
            backend = "object_store"
            bucket = "raw"
            endpoint = "https://storage.example.test"
            "#,
        )
        .unwrap();
        config.checkpoint.dir = temp_dir.path().to_path_buf();

        let mock = Arc::new(MockTransport::new());
        mock.respond(
            "https://api.example.test/ETH/day-summary/2021/6/1",
            200,
            r#"{"a":1}"#,
        );

        // No reply configured for the PUT: the storage endpoint answers 404
        let app = Application::with_transport(config, mock.clone());
        let err = app.run_once(day(2021, 6, 2)).await.unwrap_err();
        assert!(matches!(
            err,
            IngestError::Persistence(PersistenceError::Commit { .. })
        ));

        let urls = mock.requested_urls();
        assert_eq!(urls.len(), 2);
        assert!(urls[1].starts_with(
            "https://storage.example.test/raw/mercado_bitcoin/day-summary/coin=ETH/extracted_at="
        ));
        let put = &mock.requests()[1];
        assert_eq!(put.body.as_deref(), Some(&b"{\"a\": 1}\n"[..]));
    }
}
