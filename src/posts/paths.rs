//! Asset path derivation.
//!
//! Paths are `<folder>/<slug>-<original file name>`: the slug prefix keeps
//! them human-traceable and unique across posts even when two uploads
//! share a file name.

use crate::error::{Error, Result};

/// Folder for video assets.
pub const VIDEO_FOLDER: &str = "videos";

/// Folder for thumbnail assets.
pub const THUMBNAIL_FOLDER: &str = "thumbnails";

/// Derive the storage path for a post's video.
pub fn video_path(slug: &str, file_name: &str) -> Result<String> {
    asset_path(VIDEO_FOLDER, slug, file_name)
}

/// Derive the storage path for a post's thumbnail.
pub fn thumbnail_path(slug: &str, file_name: &str) -> Result<String> {
    asset_path(THUMBNAIL_FOLDER, slug, file_name)
}

fn asset_path(folder: &str, slug: &str, file_name: &str) -> Result<String> {
    validate_segment("postUrl", slug)?;
    validate_segment("file name", file_name)?;
    Ok(format!("{folder}/{slug}-{file_name}"))
}

/// Reject segments that would escape the folder or nest paths.
fn validate_segment(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{name} cannot be empty")));
    }
    if value.contains('/') || value.contains('\\') || value.contains("..") {
        return Err(Error::validation(format!(
            "{name} cannot contain path separators: {value}"
        )));
    }
    Ok(())
}
