//! Application configuration.

use crate::error::{IngestError, IngestResult};
use chrono::NaiveDate;
use mbtc_api::DEFAULT_BASE_URL;
use mbtc_core::{ApiKind, Coin};
use mbtc_persistence::StorageBackend;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the config file path.
pub const CONFIG_ENV_VAR: &str = "MBTC_CONFIG";

/// Config file used when neither the CLI nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Coins to ingest, in order.
    #[serde(default = "default_coins")]
    pub coins: Vec<Coin>,
    /// First day to fetch when an API has no checkpoint yet.
    #[serde(default = "default_start_date")]
    pub default_start_date: NaiveDate,
    /// APIs to ingest on each run.
    #[serde(default = "default_apis")]
    pub apis: Vec<ApiKind>,
    /// Upper bound on days fetched per API per run. None = catch up fully.
    #[serde(default)]
    pub max_periods: Option<usize>,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_coins() -> Vec<Coin> {
    ["BTC", "ETH", "LTC", "BCH"]
        .into_iter()
        .filter_map(|symbol| Coin::new(symbol).ok())
        .collect()
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 6, 1).unwrap_or_default()
}

fn default_apis() -> Vec<ApiKind> {
    vec![ApiKind::DaySummary]
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout (ms). Default: 10,000.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which writer backend to use.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the local backend.
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    /// Bucket for the object-store backend.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Object-store HTTP endpoint.
    #[serde(default = "default_storage_endpoint")]
    pub endpoint: String,
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_bucket() -> String {
    "data-lake-raw".to_string()
}

fn default_storage_endpoint() -> String {
    "https://s3.amazonaws.com".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root_dir: default_root_dir(),
            bucket: default_bucket(),
            endpoint: default_storage_endpoint(),
        }
    }
}

/// Checkpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Directory holding one `.checkpoint` file per API.
    #[serde(default = "default_checkpoint_dir")]
    pub dir: PathBuf,
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("./checkpoints")
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            dir: default_checkpoint_dir(),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log filter (e.g., "info", "info,mbtc=debug"). `RUST_LOG` overrides it.
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            coins: default_coins(),
            default_start_date: default_start_date(),
            apis: default_apis(),
            max_periods: None,
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            checkpoint: CheckpointConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Config path: CLI arg > `MBTC_CONFIG` env var > default.
    pub fn resolve_path(cli_path: Option<String>) -> PathBuf {
        cli_path
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
            .into()
    }

    /// Resolve the path and load it. A missing file yields the built-in
    /// defaults; the returned path is `None` in that case.
    pub fn load(cli_path: Option<String>) -> IngestResult<(Self, Option<PathBuf>)> {
        let path = Self::resolve_path(cli_path);
        if !path.exists() {
            return Ok((Self::default(), None));
        }
        let config = Self::from_file(&path)?;
        Ok((config, Some(path)))
    }

    /// Load from a specific file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> IngestResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| IngestError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> IngestResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| IngestError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make a run meaningless.
    pub fn validate(&self) -> IngestResult<()> {
        if self.apis.is_empty() {
            return Err(IngestError::Config("no APIs configured".to_string()));
        }
        if self.api.timeout_ms == 0 {
            return Err(IngestError::Config("api.timeout_ms must be > 0".to_string()));
        }
        if self.max_periods == Some(0) {
            return Err(IngestError::Config("max_periods must be > 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        let coins: Vec<&str> = config.coins.iter().map(Coin::as_str).collect();
        assert_eq!(coins, vec!["BTC", "ETH", "LTC", "BCH"]);
        assert_eq!(
            config.default_start_date,
            NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
        );
        assert_eq!(config.apis, vec![ApiKind::DaySummary]);
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            coins = ["BTC"]
            apis = ["day-summary", "trades"]

            [storage]
            backend = "object_store"
            bucket = "raw"
            "#,
        )
        .unwrap();

        assert_eq!(config.coins.len(), 1);
        assert_eq!(config.apis, vec![ApiKind::DaySummary, ApiKind::Trades]);
        assert_eq!(config.storage.backend, StorageBackend::ObjectStore);
        assert_eq!(config.storage.bucket, "raw");
        assert_eq!(config.storage.endpoint, "https://s3.amazonaws.com");
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_ms, 10_000);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(matches!(
            AppConfig::from_toml(r#"coins = [""]"#),
            Err(IngestError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_toml(r#"apis = ["orderbook"]"#),
            Err(IngestError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("apis = []"),
            Err(IngestError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("max_periods = 0"),
            Err(IngestError::Config(_))
        ));
    }

    #[test]
    fn test_resolve_path_prefers_cli() {
        assert_eq!(
            AppConfig::resolve_path(Some("custom.toml".to_string())),
            PathBuf::from("custom.toml")
        );
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.toml");

        let (config, path) = AppConfig::load(Some(missing.display().to_string())).unwrap();

        assert!(path.is_none());
        assert_eq!(config.apis, vec![ApiKind::DaySummary]);
    }

    #[test]
    fn test_load_existing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let file = temp_dir.path().join("mbtc.toml");
        std::fs::write(&file, "coins = [\"ETH\"]\nmax_periods = 5\n").unwrap();

        let (config, path) = AppConfig::load(Some(file.display().to_string())).unwrap();

        assert_eq!(path, Some(file));
        assert_eq!(config.coins, vec![Coin::new("ETH").unwrap()]);
        assert_eq!(config.max_periods, Some(5));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("default_start_date"));
        assert!(toml_str.contains("[storage]"));

        let parsed = AppConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.coins, config.coins);
    }
}
