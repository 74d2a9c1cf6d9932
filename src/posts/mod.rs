//! Post workflows and read-side queries.

pub mod orchestrator;
pub mod paths;
pub mod queries;

pub use orchestrator::{AssetUpload, NewPost, PostDelete, PostOrchestrator, PostUpdate};
