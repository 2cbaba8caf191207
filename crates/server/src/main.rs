//! Battle server entry point.
//!
//! Serves live battles over WebSocket and the encounter, reward, profile and
//! leaderboard routes over HTTP, backed by an in-memory world loaded from content files.
//!
//! # Environment Variables
//!
//! - `BATTLE_HOST` / `BATTLE_PORT`: listen address (default `127.0.0.1:8080`)
//! - `BATTLE_WORLD`: world RON file (default `data/world.ron`)
//! - `BATTLE_ACHIEVEMENTS`: achievement TOML file (default `data/achievements.toml`)
//! - `BATTLE_PACING_SCALE` and `BATTLE_*_DELAY_MS`: battle pacing
//! - `RUST_LOG`: log filter (default `info`)
mod config;
mod error;
mod identity;
mod routes;
mod socket;
mod world;

use std::sync::Arc;

use anyhow::{Context, Result};
use battle_content::{AchievementLoader, WorldLoader};
use battle_core::AchievementCatalog;
use battle_runtime::{BattleRuntime, Providers};
use config::ServerConfig;
use routes::AppState;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        addr = %config.addr(),
        world = %config.world_path.display(),
        pacing = ?config.runtime.pacing,
        "Starting battle server"
    );

    let content = WorldLoader::load(&config.world_path)
        .with_context(|| format!("loading world {}", config.world_path.display()))?;
    let catalog = match &config.achievements_path {
        Some(path) => AchievementLoader::load(path)
            .with_context(|| format!("loading achievements {}", path.display()))?,
        None => AchievementCatalog::standard(),
    };

    let world = Arc::new(world::seed(&content)?);
    let runtime = BattleRuntime::builder()
        .config(config.runtime.clone())
        .providers(Providers::from_world(world))
        .catalog(catalog)
        .build()?;

    let app = routes::router(AppState {
        runtime: Arc::new(runtime),
    });

    let listener = TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("binding {}", config.addr()))?;
    tracing::info!(addr = %config.addr(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
