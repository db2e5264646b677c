// SPDX-License-Identifier: MIT

//! Backend locators: find config drive content and materialize it into a
//! private working directory.

use std::path::{Path, PathBuf};

use crate::error::{ConfigDriveError, Result};
use crate::request::SearchRequest;

pub mod copy;
pub mod device;
pub mod extract;

#[cfg(target_os = "linux")]
pub mod linux;

pub use device::{BlockDevice, DeviceClass};
pub use extract::VolumeExtractor;

#[cfg(all(target_os = "linux", feature = "host-mount"))]
pub use extract::MountExtractor;

/// Prefix of the working directories created by locators.
pub const WORKING_DIR_PREFIX: &str = "configdrive-";

/// Outcome of a locate operation. Not finding anything is a normal result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryResult {
    NotFound,
    Found { working_dir: PathBuf },
}

impl DiscoveryResult {
    pub fn is_found(&self) -> bool {
        matches!(self, DiscoveryResult::Found { .. })
    }
}

/// Platform backend contract.
///
/// `locate` may block for as long as the media scan takes; there is no
/// timeout or cancellation at this level.
pub trait ConfigDriveLocator: Send + Sync {
    /// Searches the space described by `request`.
    ///
    /// Only environment failures (working directory allocation, device
    /// enumeration) are errors.
    fn locate(&mut self, request: &SearchRequest) -> Result<DiscoveryResult>;

    /// Working directory owned by this locator until cleanup removes it.
    fn target_path(&self) -> &Path;
}

/// Produces the locator for one service activation.
pub type LocatorSelector = Box<dyn Fn() -> Result<Box<dyn ConfigDriveLocator>> + Send + Sync>;

/// Platforms with a config drive backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Unsupported(&'static str),
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &'static str) -> Self {
        match os {
            "linux" => Platform::Linux,
            other => Platform::Unsupported(other),
        }
    }
}

/// Returns the backend for the running operating system.
pub fn select_locator() -> Result<Box<dyn ConfigDriveLocator>> {
    select_locator_for(Platform::current())
}

pub fn select_locator_for(platform: Platform) -> Result<Box<dyn ConfigDriveLocator>> {
    match platform {
        #[cfg(all(target_os = "linux", feature = "host-mount"))]
        Platform::Linux => Ok(Box::new(linux::LinuxLocator::new()?)),
        #[cfg(not(all(target_os = "linux", feature = "host-mount")))]
        Platform::Linux => Err(ConfigDriveError::UnsupportedPlatform("linux")),
        Platform::Unsupported(os) => Err(ConfigDriveError::UnsupportedPlatform(os)),
    }
}

/// Allocates a fresh working directory that outlives the handle.
pub fn allocate_working_dir() -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix(WORKING_DIR_PREFIX)
        .tempdir()
        .map_err(|e| {
            ConfigDriveError::Environment(
                anyhow::Error::new(e).context("cannot create config drive working directory"),
            )
        })?;
    Ok(dir.keep())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_selection() {
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(Platform::from_os("windows"), Platform::Unsupported("windows"));

        match select_locator_for(Platform::Unsupported("haiku")) {
            Err(ConfigDriveError::UnsupportedPlatform(os)) => assert_eq!(os, "haiku"),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("unexpected locator"),
        }
    }

    #[test]
    fn working_dir_is_kept() {
        let dir = allocate_working_dir().unwrap();
        assert!(dir.is_dir());
        assert!(
            dir.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(WORKING_DIR_PREFIX)
        );
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
