//! In-memory store backends.
//!
//! Non-persistent implementations of [`AssetStore`] and [`RecordStore`]
//! using DashMap for concurrent access. Used by tests and local
//! development; both record every call into a shared [`CallLog`] so
//! cross-store ordering is assertable, and both support failure
//! injection.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tracing::warn;

use super::asset::{AssetError, AssetStore};
use super::record::{RecordError, RecordStore};
use super::types::{AssetEntry, PostFields, PostRecord};

/// Shared sequence of store calls, in invocation order.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Create an empty call log to share between stores.
pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Drain a call log into a plain vector.
pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().expect("call log poisoned").clone()
}

/// In-memory asset store.
#[derive(Default)]
pub struct MemoryAssetStore {
    objects: DashMap<String, Vec<u8>>,
    log: CallLog,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryAssetStore {
    /// Creates a new empty in-memory asset store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that records calls into `log`.
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Make every subsequent `put` fail.
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `delete` fail.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// True if an object exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.objects.contains_key(path)
    }

    /// Fetch a stored object's bytes.
    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.get(path).map(|entry| entry.value().clone())
    }

    /// Public URL the store would report for `path`.
    pub fn public_url(path: &str) -> String {
        format!("memory://assets/{path}")
    }

    fn record(&self, call: String) {
        self.log.lock().expect("call log poisoned").push(call);
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn put(&self, path: &str, content: &[u8]) -> Result<String, AssetError> {
        self.record(format!("asset.put {path}"));
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(AssetError::WriteFailed {
                path: path.to_string(),
                reason: "injected write failure".to_string(),
            });
        }
        self.objects.insert(path.to_string(), content.to_vec());
        Ok(Self::public_url(path))
    }

    async fn delete(&self, path: &str) -> Result<(), AssetError> {
        self.record(format!("asset.delete {path}"));
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AssetError::Transport("injected delete failure".to_string()));
        }
        // Absent object: deletion already satisfied.
        self.objects.remove(path);
        Ok(())
    }

    async fn list(&self, folder: &str) -> Result<Vec<AssetEntry>, AssetError> {
        self.record(format!("asset.list {folder}"));
        let prefix = if folder.is_empty() || folder.ends_with('/') {
            folder.to_string()
        } else {
            format!("{folder}/")
        };

        let mut entries: Vec<AssetEntry> = self
            .objects
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| AssetEntry {
                name: entry
                    .key()
                    .rsplit('/')
                    .next()
                    .unwrap_or(entry.key())
                    .to_string(),
                path: entry.key().clone(),
                sha: hex::encode(entry.key().as_bytes()),
                size: entry.value().len() as u64,
                kind: "file".to_string(),
                download_url: Some(Self::public_url(entry.key())),
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn rename(&self, old_path: &str, new_path: &str) -> Result<(), AssetError> {
        self.record(format!("asset.rename {old_path} -> {new_path}"));
        let (_, content) = self
            .objects
            .remove(old_path)
            .ok_or_else(|| AssetError::NotFound {
                path: old_path.to_string(),
            })?;
        self.objects.insert(new_path.to_string(), content);
        Ok(())
    }
}

/// In-memory record store.
#[derive(Default)]
pub struct MemoryRecordStore {
    rows: DashMap<u32, PostRecord>,
    next_row: AtomicU32,
    log: CallLog,
}

impl MemoryRecordStore {
    /// Creates a new empty in-memory record store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that records calls into `log`.
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Seed a row directly, bypassing the trait API.
    pub fn insert(&self, record: PostRecord) {
        let index = record.row_index;
        self.next_row.fetch_max(index, Ordering::SeqCst);
        self.rows.insert(index, record);
    }

    /// Fetch a row by index.
    pub fn row(&self, row_index: u32) -> Option<PostRecord> {
        self.rows.get(&row_index).map(|entry| entry.value().clone())
    }

    /// Number of rows currently stored.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn record(&self, call: String) {
        self.log.lock().expect("call log poisoned").push(call);
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, fields: &PostFields) -> Result<(), RecordError> {
        self.record(format!("record.create {}", fields.post_url));
        let row_index = self.next_row.fetch_add(1, Ordering::SeqCst) + 1;
        self.rows
            .insert(row_index, PostRecord::from_fields(row_index, fields));
        Ok(())
    }

    async fn update(&self, row_index: u32, fields: &PostFields) -> Result<(), RecordError> {
        self.record(format!("record.update {row_index}"));
        let Some(mut entry) = self.rows.get_mut(&row_index) else {
            return Err(RecordError::Rejected {
                status: 404,
                message: format!("row {row_index} not found"),
            });
        };
        let views = entry.views;
        *entry = PostRecord::from_fields(row_index, fields);
        entry.views = views;
        Ok(())
    }

    async fn delete(&self, row_index: u32) -> Result<(), RecordError> {
        self.record(format!("record.delete {row_index}"));
        self.rows.remove(&row_index);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<PostRecord>, RecordError> {
        self.record("record.list".to_string());
        let mut rows: Vec<PostRecord> = self
            .rows
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|row| row.row_index);
        Ok(rows)
    }

    async fn increment_views(&self, slug: &str) -> Result<(), RecordError> {
        self.record(format!("record.increment_views {slug}"));
        let Some(mut entry) = self
            .rows
            .iter_mut()
            .find(|entry| entry.post_url == slug)
        else {
            warn!(%slug, "View increment for unknown slug; skipping");
            return Ok(());
        };
        entry.views += 1;
        Ok(())
    }
}
