//! Configuration
//!
//! Loaded once at startup from `~/.config/verdifyr/config.toml` (or
//! `/etc/verdifyr/config.toml` for system installs) and injected into the
//! components at construction. Missing file means defaults; a malformed
//! file is an error rather than silently ignored configuration.

use crate::llm_client::OracleConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub oracle: OracleConfig,

    #[serde(default)]
    pub store: StoreConfig,

    /// Optional JSON file with the full INCI vocabulary; the built-in
    /// sample is used when unset
    #[serde(default)]
    pub vocabulary_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Session logging on/off
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Database path override; default is
    /// `~/.local/share/verdifyr/search_logs.db`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl Config {
    /// Candidate config file locations, user first
    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("verdifyr").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/verdifyr/config.toml"));
        paths
    }

    /// Load the first config file found, defaults when none exists
    pub fn load() -> Result<Self> {
        for path in Self::candidate_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("failed to parse config file {:?}", path))
    }
}
