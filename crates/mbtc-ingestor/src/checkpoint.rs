//! Ingestion checkpoints.
//!
//! One file per API, `{dir}/{api}.checkpoint`, holding the next day to
//! fetch as `YYYY-MM-DD`. A missing file means the API was never ingested.

use crate::error::{IngestError, IngestResult};
use chrono::NaiveDate;
use mbtc_core::ApiKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// File-backed checkpoint store.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, api: ApiKind) -> PathBuf {
        self.dir.join(format!("{api}.checkpoint"))
    }

    /// Next day to fetch for `api`, if any was recorded.
    pub fn load(&self, api: ApiKind) -> IngestResult<Option<NaiveDate>> {
        let path = self.path(api);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let date = NaiveDate::parse_from_str(content.trim(), DATE_FORMAT).map_err(|e| {
            IngestError::Checkpoint(format!("{}: invalid date {:?}: {e}", path.display(), content.trim()))
        })?;
        Ok(Some(date))
    }

    /// Record `next` as the next day to fetch for `api`.
    ///
    /// Written to a sibling temp file then renamed; readers never see a
    /// partial date.
    pub fn save(&self, api: ApiKind, next: NaiveDate) -> IngestResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path(api);
        let tmp = tmp_path(&path);
        std::fs::write(&tmp, next.format(DATE_FORMAT).to_string())?;
        std::fs::rename(&tmp, &path)?;

        debug!(api = %api, next = %next, "Checkpoint saved");
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_checkpoint_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(temp_dir.path());
        assert_eq!(store.load(ApiKind::DaySummary).unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(temp_dir.path().join("nested"));
        let date = NaiveDate::from_ymd_opt(2021, 6, 12).unwrap();

        store.save(ApiKind::Trades, date).unwrap();

        assert_eq!(store.load(ApiKind::Trades).unwrap(), Some(date));
        assert_eq!(store.load(ApiKind::DaySummary).unwrap(), None);
        assert_eq!(
            std::fs::read_to_string(store.path(ApiKind::Trades)).unwrap(),
            "2021-06-12"
        );
    }

    #[test]
    fn test_corrupt_checkpoint_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(temp_dir.path());
        std::fs::write(store.path(ApiKind::DaySummary), "yesterday").unwrap();

        assert!(matches!(
            store.load(ApiKind::DaySummary),
            Err(IngestError::Checkpoint(_))
        ));
    }
}
