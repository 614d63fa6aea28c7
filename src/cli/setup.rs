use crate::core::config::{AppConfig, SourceConfig};
use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::info;

const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Writes the example configuration to the default location and prints what to edit next.
pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    let config = setup_at_path(&path)?;

    println!("Created configuration at {}", path.display());
    let source = match &config.snapshot {
        SourceConfig::Url { url } => url,
        SourceConfig::Path { path } => path,
    };
    println!("Point `snapshot` at your holdings feed (currently {source}),");
    println!("then add your own positions with `idxalloc custom add SYMBOL WEIGHT`.");
    Ok(())
}

/// Writes the example configuration to `path` and returns it parsed back from disk.
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if path.exists() {
        bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;
    info!(path = %path.display(), "Wrote example configuration");

    AppConfig::load_from_path(path)
}
