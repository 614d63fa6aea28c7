pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::AppContext;
use crate::cli::custom::CustomCommand;
use crate::cli::parse::ParseArgs;
use crate::cli::rebalance::RebalanceArgs;
use crate::cli::targets::TargetsArgs;
use crate::core::cache::Cache;
use crate::core::config::{AppConfig, SourceConfig};
use crate::core::holdings::IndexSnapshot;
use crate::core::snapshot::{HistoryProvider, SnapshotProvider};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const SNAPSHOT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Holdings,
    Targets(TargetsArgs),
    Custom(CustomCommand),
    Parse(ParseArgs),
    Rebalance(RebalanceArgs),
    Trend { days: i64 },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("idxalloc starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let ctx = build_context(config)?;
    match command {
        AppCommand::Holdings => cli::holdings::run(&ctx).await,
        AppCommand::Targets(args) => cli::targets::run(&ctx, &args).await,
        AppCommand::Custom(cmd) => cli::custom::run(&ctx, &cmd),
        AppCommand::Parse(args) => cli::parse::run(&ctx, &args).await,
        AppCommand::Rebalance(args) => cli::rebalance::run(&ctx, &args).await,
        AppCommand::Trend { days } => cli::trend::run(&ctx, days).await,
    }
}

fn build_context(config: AppConfig) -> Result<AppContext> {
    // Shared by the latest and the historical snapshots
    let cache = Arc::new(Cache::<String, IndexSnapshot>::with_ttl(SNAPSHOT_TTL));

    let snapshots: Box<dyn SnapshotProvider> = match &config.snapshot {
        SourceConfig::Url { url } => Box::new(providers::HttpSnapshotProvider::new(
            url,
            Arc::clone(&cache),
        )),
        SourceConfig::Path { path } => Box::new(providers::FileSnapshotProvider::new(path)),
    };

    let history: Option<Box<dyn HistoryProvider>> = config.history.as_ref().map(|source| {
        let provider: Box<dyn HistoryProvider> = match source {
            SourceConfig::Url { url } => Box::new(providers::HttpHistoryProvider::new(
                url,
                Arc::clone(&cache),
            )),
            SourceConfig::Path { path } => Box::new(providers::FileHistoryProvider::new(path)),
        };
        provider
    });

    let store = store::DiskStore::open(&config.default_data_path()?)?;
    let recognizer = providers::TesseractRecognizer::new(&config.ocr.command, &config.ocr.language);

    Ok(AppContext {
        config,
        snapshots,
        history,
        store: Box::new(store),
        recognizer: Box::new(recognizer),
    })
}
