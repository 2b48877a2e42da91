// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration module.
//!
//! Handles loading and saving application settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name used under the platform config and data dirs.
const APP_DIR: &str = "bt-token-link";

/// RFCOMM channel serial modules (HC-05, HC-06) expose SPP on.
pub const DEFAULT_RFCOMM_CHANNEL: u8 = 1;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory for persisted state.
    #[serde(skip)]
    pub data_dir: PathBuf,

    /// Bluetooth settings.
    pub bluetooth: BluetoothConfig,

    /// Console behaviour.
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BluetoothConfig {
    /// Adapter to use, e.g. "hci0". The default adapter when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,

    /// RFCOMM channel to connect on.
    pub rfcomm_channel: u8,
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            adapter: None,
            rfcomm_channel: DEFAULT_RFCOMM_CHANNEL,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// List paired devices as soon as the console starts.
    pub scan_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bluetooth: BluetoothConfig::default(),
            console: ConsoleConfig::default(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Config {
    /// Load configuration from the platform config dir or create default.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&default_config_dir())?;

        config.data_dir = default_data_dir();
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("Failed to create data directory {:?}", config.data_dir)
        })?;

        Ok(config)
    }

    /// Load `config.toml` from a directory, writing defaults if it is missing.
    pub fn load_from(config_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(config_dir)?;

        let config_path = config_dir.join("config.toml");

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)
                .with_context(|| format!("Invalid configuration in {:?}", config_path))?
        } else {
            let config = Self::default();
            config.save_to(config_dir)?;
            config
        };

        Ok(config)
    }

    fn save_to(&self, config_dir: &Path) -> Result<()> {
        let config_path = config_dir.join("config.toml");
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_written_when_missing() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(dir.path()).unwrap();

        assert_eq!(config.bluetooth.rfcomm_channel, DEFAULT_RFCOMM_CHANNEL);
        assert!(config.bluetooth.adapter.is_none());
        assert!(!config.console.scan_on_start);
        assert!(dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[bluetooth]\nadapter = \"hci1\"\n",
        )
        .unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.bluetooth.adapter.as_deref(), Some("hci1"));
        assert_eq!(config.bluetooth.rfcomm_channel, DEFAULT_RFCOMM_CHANNEL);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "bluetooth = 3").unwrap();

        assert!(Config::load_from(dir.path()).is_err());
    }
}
