//! Store clients for the two remote backends.
//!
//! The record store (one spreadsheet row per post) is the source of truth
//! for "does this post exist"; the asset store (Git-hosted binary files)
//! is a cache of its media. Both are reached over HTTP and fail
//! independently; the workflows in [`crate::posts`] tolerate partial
//! states.

pub mod asset;
pub mod memory;
pub mod record;
pub mod types;

pub use asset::{AssetError, AssetStore, GitHubAssetStore};
pub use memory::{CallLog, MemoryAssetStore, MemoryRecordStore, call_log, calls};
pub use record::{RecordError, RecordStore, SheetRecordStore};
pub use types::{AssetEntry, PostFields, PostRecord};
