//! cura-bridge - asset store / analysis service metadata synchronizer
//!
//! Walks the asset store's item list newest-first, submits each item's file
//! to the analysis service, and writes the returned classification back as
//! tags, a star rating, and an annotation. Both services are expected to be
//! running locally; the run aborts only when the asset store is unreachable.

use anyhow::Result;
use clap::Parser;
use cura_bridge::config::{BridgeConfig, ConfigOverrides, TomlConfig};
use cura_bridge::services::{AnalysisClient, AssetStoreClient};
use cura_bridge::workflow::SyncEngine;
use std::path::PathBuf;
use tracing::{error, info};

/// Synchronize asset store metadata from the analysis service
#[derive(Debug, Parser)]
#[command(name = "cura-bridge", version, about)]
struct Cli {
    /// Maximum number of items to update in this run
    #[arg(long, default_value_t = 5)]
    limit: usize,

    /// Process the entire store (ignores --limit, runs until exhaustion)
    #[arg(long)]
    all: bool,

    /// Asset store API base URL
    #[arg(long)]
    asset_store_url: Option<String>,

    /// Analysis service process endpoint
    #[arg(long)]
    analysis_url: Option<String>,

    /// Comma-separated folder ids restricting the item listing
    #[arg(long)]
    folders: Option<String>,

    /// Path to a TOML config file (default: ~/.config/cura-bridge/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting cura-bridge v{}", env!("CARGO_PKG_VERSION"));

    let toml_config = match &cli.config {
        Some(path) => TomlConfig::load(path)?,
        None => TomlConfig::load_default(),
    };

    let config = BridgeConfig::resolve(
        ConfigOverrides {
            asset_store_url: cli.asset_store_url,
            analysis_url: cli.analysis_url,
            folders: cli.folders,
        },
        &toml_config,
    );

    info!("Asset store: {}", config.asset_store_url);
    info!("Analysis service: {}", config.analysis_url);

    let store = AssetStoreClient::new(
        &config.asset_store_url,
        config.asset_store_timeout,
        config.folders.clone(),
    )?;
    let analyzer = AnalysisClient::new(&config.analysis_url, config.analysis_timeout)?;
    let engine = SyncEngine::new(store, analyzer, config);

    match engine.run_batch(cli.limit, cli.all).await {
        Ok(summary) => {
            info!("Batch complete: {}", summary.display_string());
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}
