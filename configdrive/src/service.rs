// SPDX-License-Identifier: MIT

//! Metadata service lifecycle: discover the config drive once, serve reads
//! from its working copy, then clean up.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigDriveError, Result};
use crate::locator::{ConfigDriveLocator, DiscoveryResult, LocatorSelector, select_locator};
use crate::options::ConfigDriveOptions;
use crate::path::normalize_join;
use crate::request::{SearchRequest, build_search_request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Not loaded, or cleaned up.
    Inactive,
    Loading,
    /// Content materialized, reads allowed.
    Active,
    /// The last load found no config drive.
    NotFound,
}

impl core::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ServiceState::Inactive => "inactive",
            ServiceState::Loading => "loading",
            ServiceState::Active => "active",
            ServiceState::NotFound => "not found",
        };
        f.write_str(s)
    }
}

/// A source of instance metadata.
pub trait MetadataService {
    fn name(&self) -> &str;

    /// Returns `Ok(false)` when the source is absent.
    fn load(&mut self) -> Result<bool>;

    /// Full content of the entry at `path`, relative to the source root.
    fn get_data(&self, path: &str) -> Result<Vec<u8>>;

    /// Releases everything `load` acquired. Never fails.
    fn cleanup(&mut self);
}

/// Metadata service backed by a config drive.
pub struct ConfigDriveService {
    options: ConfigDriveOptions,
    selector: LocatorSelector,
    locator: Option<Box<dyn ConfigDriveLocator>>,
    request: Option<SearchRequest>,
    working_dir: Option<PathBuf>,
    state: ServiceState,
}

impl ConfigDriveService {
    pub const NAME: &'static str = "ConfigDriveService";

    /// Uses the backend of the running platform.
    pub fn new(options: ConfigDriveOptions) -> Self {
        Self::with_selector(options, Box::new(select_locator))
    }

    pub fn with_selector(options: ConfigDriveOptions, selector: LocatorSelector) -> Self {
        Self {
            options,
            selector,
            locator: None,
            request: None,
            working_dir: None,
            state: ServiceState::Inactive,
        }
    }

    pub fn options(&self) -> &ConfigDriveOptions {
        &self.options
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Request built by the last `load`.
    pub fn request(&self) -> Option<&SearchRequest> {
        self.request.as_ref()
    }

    /// Working directory holding the drive content, while active.
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// [`MetadataService::get_data`] decoded as UTF-8, invalid sequences
    /// replaced.
    pub fn get_text(&self, path: &str) -> Result<String> {
        let data = self.get_data(path)?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    fn invalid_state(&self, operation: &'static str) -> ConfigDriveError {
        ConfigDriveError::InvalidState {
            operation,
            state: self.state,
        }
    }

    fn discover(&mut self) -> Result<DiscoveryResult> {
        let request = build_search_request(&self.options)?;
        tracing::debug!(%request, "config drive search request");
        let request = self.request.insert(request);

        let mut locator = match self.locator.take() {
            Some(locator) => locator,
            None => (self.selector)()?,
        };
        let result = locator.locate(request);

        self.locator = Some(locator);
        result
    }
}

impl MetadataService for ConfigDriveService {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn load(&mut self) -> Result<bool> {
        if self.state == ServiceState::Active {
            return Err(self.invalid_state("load"));
        }
        self.state = ServiceState::Loading;

        match self.discover() {
            Ok(DiscoveryResult::Found { working_dir }) => {
                tracing::debug!(
                    "Metadata copied to folder: {}",
                    working_dir.display()
                );
                self.working_dir = Some(working_dir);
                self.state = ServiceState::Active;
                Ok(true)
            }
            Ok(DiscoveryResult::NotFound) => {
                tracing::info!("no config drive found");
                self.state = ServiceState::NotFound;
                Ok(false)
            }
            Err(e) => {
                self.state = ServiceState::Inactive;
                Err(e)
            }
        }
    }

    fn get_data(&self, path: &str) -> Result<Vec<u8>> {
        let base = match (&self.state, &self.working_dir) {
            (ServiceState::Active, Some(dir)) => dir,
            _ => return Err(self.invalid_state("read metadata")),
        };

        let full = normalize_join(base, path);
        fs::read(&full).map_err(|e| {
            tracing::debug!(path = %full.display(), error = %e, "metadata read failed");
            ConfigDriveError::NotExistingMetadata { path: full }
        })
    }

    fn cleanup(&mut self) {
        if let Some(locator) = self.locator.take() {
            let target = locator.target_path();
            tracing::debug!("Deleting metadata folder: {}", target.display());
            if let Err(e) = fs::remove_dir_all(target)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(path = %target.display(), error = %e, "cannot remove metadata folder");
            }
        }

        self.working_dir = None;
        self.state = ServiceState::Inactive;
    }
}
