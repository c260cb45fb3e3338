// Copyright 2026 eTRV Team
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

//! Configuration for the `etrvctl` binary.
//!
//! Stores the PIN and retrieved secret key per device address. The
//! library itself persists nothing; key storage is the caller's job, and
//! for the CLI this file is that caller.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// On-disk CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Per-device entries, keyed by Bluetooth address.
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceConfig>,
}

/// Stored state for one device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// 4-character ASCII PIN; factory default when absent.
    pub pin: Option<String>,

    /// Secret key as 32 hex characters, as printed by `etrvctl pair`.
    pub secret: Option<String>,
}

impl Config {
    fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("etrv")
            .join("config.toml")
    }

    /// Load configuration, or start empty when none exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Save configuration, creating the directory on first use.
    pub fn save(&self) -> Result<()> {
        let path = Self::path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Stored entry for a device, empty when unknown.
    pub fn device(&self, address: &str) -> DeviceConfig {
        self.devices.get(address).cloned().unwrap_or_default()
    }

    /// Record the secret key retrieved from a device.
    pub fn set_secret(&mut self, address: &str, secret: String) {
        self.devices.entry(address.to_string()).or_default().secret = Some(secret);
    }
}
