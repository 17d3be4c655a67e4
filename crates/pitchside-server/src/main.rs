//! Pitchside server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! storage, loads the identity and domain stores from it, and serves the
//! JSON API under `/api`.

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use pitchside_api::AppStores;
use pitchside_store_sqlite::SqliteStorage;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Pitchside progress-tracker server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  if let Some(dir) = server_cfg.store_path.parent()
    && !dir.as_os_str().is_empty()
  {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create {}", dir.display()))?;
  }

  let storage = SqliteStorage::open(&server_cfg.store_path).with_context(|| {
    format!("failed to open store at {:?}", server_cfg.store_path)
  })?;
  let stores = AppStores::open(storage)
    .context("failed to load stores")?
    .with_min_password_len(server_cfg.min_password_len)
    .into_shared();

  let app = Router::new()
    .nest("/api", pitchside_api::api_router(stores))
    .layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
