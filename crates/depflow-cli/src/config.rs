//! `depflow.toml` loading.
//!
//! Every field has a serde default, so a partial file (or no file at all)
//! still yields a complete [`DepflowConfig`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use depflow_core::ErrorCode;
use depflow_core::generate::DEFAULT_SEED;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "depflow.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepflowConfig {
    #[serde(default)]
    pub generate: GenerateConfig,
    #[serde(default)]
    pub analyze: AnalyzeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            out_dir: default_out_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeConfig {
    /// List every component's members in pretty output.
    #[serde(default = "default_true")]
    pub show_components: bool,
    /// Longest vertex list printed in pretty output before truncating.
    /// `0` disables truncation.
    #[serde(default = "default_max_listed")]
    pub max_listed: usize,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            show_components: default_true(),
            max_listed: default_max_listed(),
        }
    }
}

const fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("data")
}

const fn default_true() -> bool {
    true
}

const fn default_max_listed() -> usize {
    50
}

/// Load configuration from `explicit`, or from `depflow.toml` in the
/// working directory.
///
/// A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<DepflowConfig> {
    let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    if !path.exists() {
        if explicit.is_some() {
            warn!(path = %path.display(), "config file not found, using defaults");
        }
        return Ok(DepflowConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(path = %path.display(), ?config, "config loaded");
    Ok(config)
}

fn parse_config(content: &str) -> Result<DepflowConfig> {
    toml::from_str::<DepflowConfig>(content).with_context(|| {
        let code = ErrorCode::ConfigParseError;
        format!("{} {}", code.code(), code.message())
    })
}
