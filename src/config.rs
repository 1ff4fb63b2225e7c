// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings come from an optional YAML file. The storage directory is
//! resolved in priority order: command-line flag, `MAPMARKS_STORE`
//! environment variable, config file, built-in default.

use crate::error::{Error, Result};
use crate::repository::DEFAULT_COLLECTION_KEY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the storage directory.
pub const STORE_ENV_VAR: &str = "MAPMARKS_STORE";

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "mapmarks.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the key-value files.
    pub storage_dir: PathBuf,
    /// Key under which all projects are stored.
    pub collection_key: String,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Indent exported JSON and GeoJSON.
    pub pretty_exports: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("mapmarks-data"),
            collection_key: DEFAULT_COLLECTION_KEY.to_string(),
            log_level: "info".to_string(),
            pretty_exports: true,
        }
    }
}

impl AppConfig {
    /// Parse YAML config text; missing fields take their defaults.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load `path`, or `mapmarks.yaml` if it exists, or defaults.
    ///
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_yaml(&text)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply the command-line and environment overrides for the storage
    /// directory.
    pub fn resolve_storage_dir(&mut self, cli_arg: Option<PathBuf>, env_value: Option<String>) {
        if let Some(dir) = cli_arg {
            self.storage_dir = dir;
        } else if let Some(dir) = env_value.filter(|v| !v.is_empty()) {
            self.storage_dir = PathBuf::from(dir);
        }
    }
}
