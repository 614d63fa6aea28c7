use crate::core::alias::AliasGroup;
use crate::core::extract::ExtractOptions;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Where a snapshot (or the history directory) is read from.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum SourceConfig {
    Url { url: String },
    Path { path: String },
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub paste_min_value: f64,
    #[serde(default = "default_ocr_min_value")]
    pub ocr_min_value: f64,
    #[serde(default = "default_ocr_lookahead")]
    pub ocr_lookahead: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            paste_min_value: 0.0,
            ocr_min_value: default_ocr_min_value(),
            ocr_lookahead: default_ocr_lookahead(),
        }
    }
}

impl ExtractionConfig {
    pub fn paste_options(&self) -> ExtractOptions {
        ExtractOptions {
            min_value: self.paste_min_value,
            ..ExtractOptions::paste()
        }
    }

    pub fn ocr_options(&self) -> ExtractOptions {
        ExtractOptions {
            lookahead: self.ocr_lookahead,
            min_value: self.ocr_min_value,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OcrConfig {
    pub command: String,
    #[serde(default = "default_ocr_language")]
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        OcrConfig {
            command: "tesseract".to_string(),
            language: default_ocr_language(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub snapshot: SourceConfig,
    #[serde(default)]
    pub history: Option<SourceConfig>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_rescale")]
    pub rescale_top_to_full: bool,
    #[serde(default = "default_aliases")]
    pub aliases: Vec<AliasGroup>,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    pub data_path: Option<String>,
}

fn default_top_n() -> usize {
    10
}

fn default_rescale() -> bool {
    true
}

fn default_aliases() -> Vec<AliasGroup> {
    vec![AliasGroup::alphabet()]
}

fn default_ocr_min_value() -> f64 {
    ExtractOptions::ocr().min_value
}

fn default_ocr_lookahead() -> usize {
    ExtractOptions::ocr().lookahead
}

fn default_ocr_language() -> String {
    "eng".to_string()
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "idxalloc", "idxalloc")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "idxalloc", "idxalloc")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
