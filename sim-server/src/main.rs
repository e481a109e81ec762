//! Reference binary embedding the simulation core: loads [`SimConfig`],
//! bootstraps a [`SimApp`], and runs until interrupted.

mod app;
mod broadcaster;
mod config;
mod entity_factory;
mod entity_source;
mod publisher;
mod repository;

use std::env;

use app::SimApp;
use config::SimConfig;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn load_config() -> SimConfig {
    let Some(path) = env::args().nth(1) else {
        tracing::info!("no config path given, using defaults");
        return SimConfig::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(source) => match SimConfig::from_json5(&source) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(path, error = %err, "failed to parse config, using defaults");
                SimConfig::default()
            }
        },
        Err(err) => {
            tracing::error!(path, error = %err, "failed to read config, using defaults");
            SimConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = load_config();
    let app = SimApp::bootstrap(&config);
    app.start();
    tracing::info!(tick_interval_ms = config.tick_interval_ms, "simulation core started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    app.shutdown().await;

    Ok(())
}
