//! Configuration file support for fpgaforge.
//!
//! Two configuration file locations are read:
//! - Global: `~/.fpgaforge/config.toml` - User-wide defaults
//! - Project: `.fpgaforge/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::shim::BackendId;

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR_NAME: &str = ".fpgaforge";

/// fpgaforge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildSettings,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Default backend when the manifest does not name one
    pub backend: Option<String>,

    /// Default output directory for rendered scripts
    pub outdir: Option<PathBuf>,

    /// Directory searched for template overrides
    pub template_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.backend.is_some() {
            self.build.backend = other.build.backend;
        }
        if other.build.outdir.is_some() {
            self.build.outdir = other.build.outdir;
        }
        if other.build.template_dir.is_some() {
            self.build.template_dir = other.build.template_dir;
        }
    }

    /// Parse the default backend.
    ///
    /// Unknown names are reported with the list of valid backends.
    pub fn backend(&self) -> Result<Option<BackendId>> {
        self.build
            .backend
            .as_deref()
            .map(|s| s.parse::<BackendId>())
            .transpose()
            .context("invalid `build.backend` in config")
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.fpgaforge/config.toml)
/// 2. Global config (~/.fpgaforge/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global config directory (~/.fpgaforge).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR_NAME))
}

/// Get the global config path (~/.fpgaforge/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.fpgaforge/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR_NAME).join("config.toml")
}
