// SPDX-License-Identifier: MIT

//! Config drive metadata service.
//!
//! A config drive is a small ISO 9660 or FAT volume labelled `config-2`
//! that a cloud attaches to an instance. [`ConfigDriveService`] turns the
//! configured search space into a [`SearchRequest`], hands it to the
//! platform [`locator`], and serves metadata files from the working copy
//! the locator produced until [`MetadataService::cleanup`].

pub mod error;
pub mod locator;
pub mod options;
/// Lexical path normalization.
pub mod path;
pub mod request;
pub mod service;
pub mod types;

pub use error::{ConfigDriveError, Result};
pub use locator::copy::list_files;
pub use locator::{ConfigDriveLocator, DiscoveryResult, LocatorSelector, Platform, select_locator};
pub use options::{Config, ConfigDriveOptions};
pub use request::{SearchRequest, SearchRequestBuilder, build_search_request};
pub use service::{ConfigDriveService, MetadataService, ServiceState};
pub use types::{CD_LOCATIONS, CD_TYPES, ContentFormat, SearchLocation};

/// Label of the volume a config drive lives on.
pub use driveprobe::CONFIG_DRIVE_LABEL;
