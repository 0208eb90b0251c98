//! Backend selection.

use crate::destination::Destination;
use crate::error::PersistenceResult;
use crate::object_store::{DynObjectStore, ObjectStoreWriter};
use crate::writer::{DataWriter, LocalFileWriter};
use chrono::{DateTime, Utc};
use mbtc_core::{ApiKind, Coin};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage backend name as it appears in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Files under a local root directory.
    #[default]
    Local,
    /// One object per writer in a bucket.
    ObjectStore,
}

/// Creates one fresh writer per (coin, api) fetch.
#[derive(Clone)]
pub enum WriterFactory {
    Local {
        root: PathBuf,
    },
    ObjectStore {
        store: DynObjectStore,
        bucket: String,
    },
}

impl WriterFactory {
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::Local { root: root.into() }
    }

    pub fn object_store(store: DynObjectStore, bucket: impl Into<String>) -> Self {
        Self::ObjectStore {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn backend(&self) -> StorageBackend {
        match self {
            Self::Local { .. } => StorageBackend::Local,
            Self::ObjectStore { .. } => StorageBackend::ObjectStore,
        }
    }

    /// Writer whose destination is captured now.
    pub fn create(&self, api: ApiKind, coin: &Coin) -> PersistenceResult<Box<dyn DataWriter>> {
        self.create_at(api, coin, Utc::now())
    }

    /// Writer with an explicit capture time.
    pub fn create_at(
        &self,
        api: ApiKind,
        coin: &Coin,
        captured_at: DateTime<Utc>,
    ) -> PersistenceResult<Box<dyn DataWriter>> {
        let destination = Destination::new(api, coin.clone(), captured_at);
        let writer: Box<dyn DataWriter> = match self {
            Self::Local { root } => Box::new(LocalFileWriter::new(root, destination)),
            Self::ObjectStore { store, bucket } => Box::new(ObjectStoreWriter::new(
                store.clone(),
                bucket.clone(),
                destination,
            )?),
        };
        Ok(writer)
    }
}
