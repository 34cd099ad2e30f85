//! MealMood API Server
//!
//! Run with: cargo run --bin mealmood -- [--config path/to/config.toml]
//!
//! # Configuration
//!
//! Settings come from the first config file found (see `mealmood-cli config`)
//! with `MEALMOOD_*` environment overrides applied on top. `RUST_LOG`
//! overrides the configured log level.

use anyhow::Context;
use clap::Parser;
use mealmood::api::{serve, AppState};
use mealmood::config::{Config, LoggingConfig};
use mealmood::insights::InsightEngine;
use mealmood::producers::Journal;
use mealmood::sync::HttpRecordSync;
use mealmood::timeline::TimelineHandle;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mealmood")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Meal & mood timeline API server")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {:?}", path))?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting MealMood API server v{}", env!("CARGO_PKG_VERSION"));

    let factory = config.event_factory()?;
    tracing::info!("Local-hour offset: {}", factory.offset());

    let timeline = TimelineHandle::new();
    let mut journal = Journal::new(timeline.clone(), factory);

    match HttpRecordSync::from_config(&config.sync)? {
        Some(sync) => {
            tracing::info!("Record sync enabled: {}", config.sync.base_url);
            journal = journal.with_sync(Arc::new(sync));
        }
        None => tracing::info!("Record sync disabled"),
    }

    spawn_version_logger(&timeline);

    let engine = InsightEngine::new(config.insights.clone());
    let state = AppState::new(journal, engine, config.api.clone());

    // Run server
    tracing::info!("Starting server on {}", config.api.addr());
    serve(state, &config.api).await?;

    tracing::info!(
        events = timeline.len().await,
        "MealMood API server stopped"
    );

    Ok(())
}

/// Initialize tracing from the logging config; `RUST_LOG` takes precedence
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("mealmood={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Log every timeline change
fn spawn_version_logger(timeline: &TimelineHandle) {
    let mut rx = timeline.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let version = *rx.borrow_and_update();
            tracing::debug!(version, "Timeline changed");
        }
    });
}
