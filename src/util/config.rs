//! Configuration file support.
//!
//! Both binaries read an optional `alfa-build.toml` from the working
//! directory (or the path given with `--config`). Every section and field is
//! optional; missing values fall back to the project's fixed layout.
//!
//! ```toml
//! [build]
//! strict = true
//!
//! [layout]
//! source_root = "../src/"
//! cuda_path = "C:\\CUDA\\v9.0\\"
//!
//! [release.networks]
//! standard_conv_8x128 = "/data/runs/standard_15x15/network_swa.bin"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::context::BuildLayout;
use crate::ops::release::ReleaseConfig;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "alfa-build.toml";

/// Configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildSettings,

    /// Source and output paths
    pub layout: BuildLayout,

    /// Release staging settings
    pub release: ReleaseConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Stop at the first failing command
    pub strict: bool,

    /// Delete object files once the archive has been created
    pub clear_objects: bool,
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
}

/// Resolve the configuration for a binary invocation.
///
/// An explicitly requested file must load; the implicit
/// [`CONFIG_FILE_NAME`] is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load(path),
        None => Ok(Config::load_or_default(&PathBuf::from(CONFIG_FILE_NAME))),
    }
}
