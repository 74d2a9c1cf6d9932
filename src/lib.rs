//! reelpress
//!
//! Admin backend for a video blog. Post metadata lives in a remote
//! spreadsheet-backed record store; each post's binary assets (video,
//! thumbnail) live in a remote Git-based content store. A single
//! administrator authenticates with a stateless HMAC-signed session
//! cookie; the post workflows keep the two independently-failing stores
//! consistent enough with delete-after-upload ordering and best-effort
//! compensating cleanup.
//!
//! # Modules
//! - **auth**: session token codec and session gate
//! - **stores**: asset store (Git contents API) and record store (sheet
//!   endpoint) clients, plus in-memory backends for tests
//! - **posts**: create/update/delete workflows and read-side queries
//! - **http**: axum router, handlers, CORS and origin policy
//! - **config**: explicit startup configuration from the environment

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod posts;
pub mod stores;

pub use config::Config;
pub use error::{Error, Result};
