//! JSON Lines writers.
//!
//! Uses JSON Lines for robustness:
//! - Each line is a complete JSON object
//! - Append-only: repeated writes of the same data produce duplicate lines
//! - Files can be read even if a later write was interrupted

use crate::destination::Destination;
use crate::error::PersistenceResult;
use crate::payload::Payload;
use mbtc_api::BoxFuture;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Common capability set of every storage backend.
///
/// `append` validates and persists (or stages) one payload; `commit` makes
/// staged data visible remotely. Backends without a staging step treat
/// `commit` as a no-op.
pub trait DataWriter: Send {
    /// Destination chosen at construction.
    fn destination(&self) -> &Destination;

    /// Append a record or a sequence of records, returning the line count.
    ///
    /// Nothing is persisted if the payload is rejected.
    fn append(&mut self, data: &Value) -> PersistenceResult<usize>;

    /// Publish everything appended so far.
    fn commit(&mut self) -> BoxFuture<'_, PersistenceResult<()>>;

    /// Append then commit.
    fn write<'a>(&'a mut self, data: &'a Value) -> BoxFuture<'a, PersistenceResult<usize>> {
        Box::pin(async move {
            let lines = self.append(data)?;
            self.commit().await?;
            Ok(lines)
        })
    }
}

/// Writer appending directly to a file under a root directory.
///
/// The file is created lazily on the first non-empty append, together with
/// its parent directories. Each append is flushed and synced before
/// returning.
#[derive(Debug)]
pub struct LocalFileWriter {
    destination: Destination,
    /// Absolute (or root-relative) output path.
    path: PathBuf,
    /// Lines written by this writer.
    lines_written: usize,
}

impl LocalFileWriter {
    pub fn new(root: impl AsRef<Path>, destination: Destination) -> Self {
        let path = root.as_ref().join(destination.local_path());
        Self {
            destination,
            path,
            lines_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }
}

impl DataWriter for LocalFileWriter {
    fn destination(&self) -> &Destination {
        &self.destination
    }

    fn append(&mut self, data: &Value) -> PersistenceResult<usize> {
        let payload = Payload::from_value(data)?;
        if payload.is_empty() {
            return Ok(0);
        }
        let bytes = payload.to_json_lines()?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Open in append mode - won't truncate existing data
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&bytes)?;
        file.sync_data()?;

        self.lines_written += payload.len();
        debug!(
            path = %self.path.display(),
            records = payload.len(),
            "Appended records to JSON Lines file"
        );

        Ok(payload.len())
    }

    fn commit(&mut self) -> BoxFuture<'_, PersistenceResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
