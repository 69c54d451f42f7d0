use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use posture_server::config::Config;
use posture_server::db::Database;
use posture_server::{http, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = Config::from_env();
    info!("Posture server starting up...");

    let database = Database::new(config.database_path.clone())?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(AppState {
        db: database,
        config,
    });
    let app = http::routes(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Posture server running on http://{addr}");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
