//! Object-storage backend.
//!
//! Lines are staged in a local temporary file; `commit` uploads the whole
//! staged buffer as a single object under the destination key. A failed
//! upload is reported to the caller and never retried; the staging file
//! keeps its content.

use crate::destination::Destination;
use crate::error::{PersistenceError, PersistenceResult};
use crate::payload::Payload;
use crate::writer::DataWriter;
use mbtc_api::{BoxFuture, DynHttpTransport, HttpRequest};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Upload did not complete.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ObjectStoreError(pub String);

/// Trait for putting whole objects into a bucket.
pub trait ObjectStore: Send + Sync {
    /// Store `body` at `bucket`/`key`, replacing any previous object.
    fn put_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), ObjectStoreError>>;
}

/// Arc wrapper for ObjectStore trait objects.
pub type DynObjectStore = Arc<dyn ObjectStore>;

/// Object store reached through plain HTTP `PUT {endpoint}/{bucket}/{key}`.
///
/// Requests are unsigned; use a presigning proxy or a bucket policy that
/// accepts them.
pub struct HttpObjectStore {
    transport: DynHttpTransport,
    endpoint: String,
}

impl HttpObjectStore {
    pub fn new(transport: DynHttpTransport, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    /// Object URL with each key segment percent-encoded.
    pub fn object_url(&self, bucket: &str, key: &str) -> Result<String, ObjectStoreError> {
        let mut url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| ObjectStoreError(format!("invalid endpoint {}: {e}", self.endpoint)))?;
        url.path_segments_mut()
            .map_err(|()| ObjectStoreError(format!("endpoint cannot be a base: {}", self.endpoint)))?
            .pop_if_empty()
            .push(bucket)
            .extend(key.split('/'));
        Ok(url.to_string())
    }
}

impl ObjectStore for HttpObjectStore {
    fn put_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), ObjectStoreError>> {
        Box::pin(async move {
            let url = self.object_url(bucket, key)?;
            let request =
                HttpRequest::put(url.as_str(), body).with_header("content-type", "application/x-ndjson");

            let response = self
                .transport
                .execute(request)
                .await
                .map_err(|e| ObjectStoreError(e.to_string()))?;

            if !response.is_success() {
                return Err(ObjectStoreError(format!(
                    "PUT {url} returned HTTP {}",
                    response.status
                )));
            }
            Ok(())
        })
    }
}

/// In-memory object store for testing.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    /// Stored objects by (bucket, key).
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    /// Total put calls, including failed ones.
    puts: AtomicUsize,
    /// Whether puts should fail.
    failing: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent puts fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Stored keys in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), ObjectStoreError>> {
        Box::pin(async move {
            self.puts.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(ObjectStoreError("store unavailable".to_string()));
            }
            self.objects
                .lock()
                .insert((bucket.to_string(), key.to_string()), body);
            Ok(())
        })
    }
}

/// Lifecycle of an `ObjectStoreWriter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Nothing appended yet.
    Created,
    /// Lines staged since the last successful commit.
    Writing,
    /// Staged buffer uploaded.
    Committed,
}

/// Writer staging lines locally and uploading them on commit.
pub struct ObjectStoreWriter {
    destination: Destination,
    store: DynObjectStore,
    bucket: String,
    key: String,
    /// Local staging buffer, removed on drop.
    staging: NamedTempFile,
    staged_lines: usize,
    state: WriterState,
}

impl ObjectStoreWriter {
    pub fn new(
        store: DynObjectStore,
        bucket: impl Into<String>,
        destination: Destination,
    ) -> PersistenceResult<Self> {
        let key = destination.object_key();
        Ok(Self {
            destination,
            store,
            bucket: bucket.into(),
            key,
            staging: NamedTempFile::new()?,
            staged_lines: 0,
            state: WriterState::Created,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Lines in the staging buffer (committed or not).
    pub fn staged_lines(&self) -> usize {
        self.staged_lines
    }
}

impl DataWriter for ObjectStoreWriter {
    fn destination(&self) -> &Destination {
        &self.destination
    }

    fn append(&mut self, data: &Value) -> PersistenceResult<usize> {
        let payload = Payload::from_value(data)?;
        let bytes = payload.to_json_lines()?;

        let file = self.staging.as_file_mut();
        file.write_all(&bytes)?;
        file.flush()?;

        self.staged_lines += payload.len();
        self.state = WriterState::Writing;
        debug!(key = %self.key, records = payload.len(), "Staged records");

        Ok(payload.len())
    }

    fn commit(&mut self) -> BoxFuture<'_, PersistenceResult<()>> {
        Box::pin(async move {
            let body = tokio::fs::read(self.staging.path()).await?;
            let bytes = body.len();

            if let Err(source) = self.store.put_object(&self.bucket, &self.key, body).await {
                warn!(bucket = %self.bucket, key = %self.key, error = %source, "Commit failed");
                return Err(PersistenceError::Commit {
                    key: self.key.clone(),
                    source,
                });
            }

            self.state = WriterState::Committed;
            info!(
                bucket = %self.bucket,
                key = %self.key,
                lines = self.staged_lines,
                bytes,
                "Committed staged buffer"
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mbtc_api::{HttpMethod, MockTransport};
    use mbtc_core::{ApiKind, Coin};
    use serde_json::json;

    const BUCKET: &str = "data-lake-raw";

    fn destination() -> Destination {
        Destination::new(
            ApiKind::DaySummary,
            Coin::new("BTC").unwrap(),
            Utc.with_ymd_and_hms(2021, 6, 21, 12, 30, 0).unwrap(),
        )
    }

    fn make_writer(store: &Arc<InMemoryObjectStore>) -> ObjectStoreWriter {
        ObjectStoreWriter::new(store.clone(), BUCKET, destination()).unwrap()
    }

    fn stored(store: &InMemoryObjectStore, writer: &ObjectStoreWriter) -> String {
        String::from_utf8(store.get(BUCKET, writer.key()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_write_uploads_under_destination_key() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut writer = make_writer(&store);
        assert_eq!(writer.state(), WriterState::Created);

        writer.write(&json!({"a": 1})).await.unwrap();

        assert_eq!(writer.state(), WriterState::Committed);
        assert_eq!(store.keys(BUCKET), vec![destination().object_key()]);
        assert_eq!(stored(&store, &writer), "{\"a\": 1}\n");
    }

    #[tokio::test]
    async fn test_append_without_commit_uploads_nothing() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut writer = make_writer(&store);

        writer.append(&json!([{"a": 1}, {"b": 2}])).unwrap();

        assert_eq!(writer.state(), WriterState::Writing);
        assert_eq!(writer.staged_lines(), 2);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_each_commit_uploads_whole_buffer() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut writer = make_writer(&store);

        writer.write(&json!({"a": 1})).await.unwrap();
        writer.write(&json!([{"b": 2}, {"c": 3}])).await.unwrap();

        assert_eq!(store.put_count(), 2);
        assert_eq!(store.keys(BUCKET).len(), 1);
        assert_eq!(stored(&store, &writer), "{\"a\": 1}\n{\"b\": 2}\n{\"c\": 3}\n");
    }

    #[tokio::test]
    async fn test_commit_failure_surfaces() {
        let store = Arc::new(InMemoryObjectStore::new());
        store.set_failing(true);
        let mut writer = make_writer(&store);

        let err = writer.write(&json!({"a": 1})).await.unwrap_err();

        match err {
            PersistenceError::Commit { key, .. } => assert_eq!(key, writer.key()),
            other => panic!("expected Commit error, got {other:?}"),
        }
        // Staging buffer kept, no automatic retry
        assert_eq!(writer.state(), WriterState::Writing);
        assert_eq!(writer.staged_lines(), 1);
        assert_eq!(store.put_count(), 1);

        store.set_failing(false);
        writer.commit().await.unwrap();
        assert_eq!(stored(&store, &writer), "{\"a\": 1}\n");
    }

    #[tokio::test]
    async fn test_unsupported_data_stages_nothing() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut writer = make_writer(&store);

        let err = writer.write(&json!([{"a": 1}, "nope"])).await.unwrap_err();

        assert!(matches!(err, PersistenceError::UnsupportedDataType { .. }));
        assert_eq!(writer.staged_lines(), 0);
        assert_eq!(writer.state(), WriterState::Created);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_writes_duplicate_lines() {
        let store = Arc::new(InMemoryObjectStore::new());
        let mut writer = make_writer(&store);

        writer.write(&json!({"a": 1})).await.unwrap();
        writer.write(&json!({"a": 1})).await.unwrap();

        assert_eq!(stored(&store, &writer), "{\"a\": 1}\n{\"a\": 1}\n");
    }

    #[test]
    fn test_http_object_url_encodes_segments() {
        let store = HttpObjectStore::new(Arc::new(MockTransport::new()), "https://s3.example.test/");
        let url = store.object_url(BUCKET, &destination().object_key()).unwrap();
        assert_eq!(
            url,
            "https://s3.example.test/data-lake-raw/mercado_bitcoin/day-summary/coin=BTC/\
             extracted_at=2021-06-21/day-summary_BTC_2021-06-21%2012:30:00.000000.json"
        );
    }

    #[tokio::test]
    async fn test_http_object_store_puts_body() {
        let mock = Arc::new(MockTransport::new());
        let store = HttpObjectStore::new(mock.clone(), "https://s3.example.test");
        let url = store.object_url(BUCKET, "a/b.json").unwrap();
        mock.respond(url.as_str(), 200, "");

        store
            .put_object(BUCKET, "a/b.json", b"{\"a\": 1}\n".to_vec())
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Put);
        assert_eq!(requests[0].url, "https://s3.example.test/data-lake-raw/a/b.json");
        assert_eq!(requests[0].body.as_deref(), Some(&b"{\"a\": 1}\n"[..]));
    }

    #[tokio::test]
    async fn test_http_object_store_rejected_put() {
        let mock = Arc::new(MockTransport::new());
        let store = HttpObjectStore::new(mock.clone(), "https://s3.example.test");

        let err = store
            .put_object(BUCKET, "a/b.json", Vec::new())
            .await
            .unwrap_err();
        assert!(err.0.contains("HTTP 404"));
    }
}
