// SPDX-License-Identifier: MIT

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::types::CD_LOCATIONS;

/// Config drive search settings.
///
/// Names are kept as plain strings: an unknown type or location must reach
/// the request builder so it can be reported by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigDriveOptions {
    /// Content formats to look for.
    pub types: Vec<String>,
    /// Locations to search.
    pub locations: Vec<String>,

    /// Deprecated: look for raw ISO content on physical disks.
    pub raw_hdd: bool,
    /// Deprecated: look for ISO content on optical drives.
    pub cdrom: bool,
    /// Deprecated: look for a vfat filesystem on physical disks.
    pub vfat: bool,
}

impl Default for ConfigDriveOptions {
    fn default() -> Self {
        Self {
            types: vec!["vfat".into(), "iso".into()],
            locations: CD_LOCATIONS.iter().map(|l| l.to_string()).collect(),
            raw_hdd: false,
            cdrom: false,
            vfat: false,
        }
    }
}

impl ConfigDriveOptions {
    /// Options with empty sets and every legacy flag off.
    pub fn empty() -> Self {
        Self {
            types: Vec::new(),
            locations: Vec::new(),
            ..Self::default()
        }
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    /// True if any deprecated flag is set.
    pub fn uses_legacy_flags(&self) -> bool {
        self.raw_hdd || self.cdrom || self.vfat
    }
}

/// Settings file: every section is optional.
///
/// ```toml
/// [config_drive]
/// types = ["iso"]
/// locations = ["cdrom", "hdd"]
/// cdrom = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub config_drive: ConfigDriveOptions,
}

impl Config {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config drive settings");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
