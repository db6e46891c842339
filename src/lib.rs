pub mod analysis;
pub mod api;
pub mod db;
pub mod reports;
pub mod settings;
pub mod stores;
mod utils;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use analysis::AnalysisEngine;
use api::{api_router, ApiContext};
use db::Database;
use settings::SettingsStore;
use stores::Stores;

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("GlucoTrack starting up...");

    let data_dir = settings::data_dir();
    let settings = SettingsStore::open_in(&data_dir)?;
    let server = settings.server();
    let addr = server.socket_addr()?;

    let database = Database::new(settings::database_path(&data_dir))?;
    log::info!("Using database at {}", database.path().display());

    let engine = AnalysisEngine::new(Stores::shared(database), settings.analysis());
    let app = api_router(ApiContext::new(engine));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    runtime.block_on(async move {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        log::info!("Listening on http://{addr}");
        axum::serve(listener, app).await.context("HTTP server stopped")
    })
}
