//! reelpress server binary.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reelpress::auth::{SessionGate, TokenCodec};
use reelpress::config::Config;
use reelpress::http::{self, AppState, OriginPolicy};
use reelpress::posts::PostOrchestrator;
use reelpress::stores::{AssetStore, GitHubAssetStore, RecordStore, SheetRecordStore};

#[derive(Debug, Parser)]
#[command(name = "reelpress", version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8787")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reelpress=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let gate = SessionGate::new(
        TokenCodec::new(config.session_secret.as_bytes()),
        &config.admin_username,
        &config.admin_password,
    );
    let assets: Arc<dyn AssetStore> = Arc::new(GitHubAssetStore::new(
        &config.github_token,
        &config.github_owner,
        &config.github_repo,
    )?);
    let records: Arc<dyn RecordStore> =
        Arc::new(SheetRecordStore::new(&config.sheet_url, &config.sheet_key)?);

    let state = AppState {
        gate: Arc::new(gate),
        posts: Arc::new(PostOrchestrator::new(assets.clone(), records.clone())),
        assets,
        records,
        origins: Arc::new(OriginPolicy::new(
            &config.allowed_domain,
            &config.allowed_public_domain,
        )),
    };

    let app = http::app(state);
    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!(addr = %args.bind, "reelpress listening");
    axum::serve(listener, app).await?;

    Ok(())
}
