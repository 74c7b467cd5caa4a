//! `figport.toml` configuration.
//!
//! ```toml
//! [export]
//! output = "migration.txt.zst"
//! compression_level = 19
//! forbidden_dir = "ballsdex"
//!
//! [import]
//! input = "migration.txt.zst"
//! forbidden_dir = "carfigures"
//! confirm_timeout_secs = 20
//! strict_digest = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use figport::limits::DEFAULT_COMPRESSION_LEVEL;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "figport.toml";

const DEFAULT_DOCUMENT: &str = "migration.txt.zst";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FigportConfig {
    pub export: ExportConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where the compressed document is written.
    pub output: PathBuf,
    pub compression_level: i32,
    /// Export refuses to run when this directory exists in the working directory.
    pub forbidden_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_DOCUMENT),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            forbidden_dir: "ballsdex".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Compressed document to read.
    pub input: PathBuf,
    /// Import refuses to run when this directory exists in the working directory.
    pub forbidden_dir: String,
    /// Seconds to wait for `proceed` / `cancel`.
    pub confirm_timeout_secs: u64,
    /// Fail instead of warning when the document's defaults digest differs
    /// from the built-in export table.
    pub strict_digest: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_DOCUMENT),
            forbidden_dir: "carfigures".to_string(),
            confirm_timeout_secs: 20,
            strict_digest: false,
        }
    }
}

impl ImportConfig {
    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }
}

impl FigportConfig {
    /// Parses a configuration file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Loads `explicit` if given, else `figport.toml` in `dir` if present,
    /// else the defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        let fallback = dir.join(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            Self::load_from_file(&fallback)
        } else {
            Ok(Self::default())
        }
    }
}
