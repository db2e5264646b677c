// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use crate::service::ServiceState;

pub type Result<T, E = ConfigDriveError> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigDriveError {
    /// A configured set holds names outside the supported universe.
    #[error("Invalid Config Drive {field} {invalid:?}")]
    Configuration {
        field: &'static str,
        invalid: Vec<String>,
    },

    /// The requested metadata entry cannot be opened.
    #[error("metadata not found: {}", path.display())]
    NotExistingMetadata { path: PathBuf },

    /// Operation not allowed in the current lifecycle state.
    #[error("cannot {operation} while the service is {state}")]
    InvalidState {
        operation: &'static str,
        state: ServiceState,
    },

    #[error("no config drive backend for platform '{0}'")]
    UnsupportedPlatform(&'static str),

    /// Failure of the environment the locator runs in.
    #[error("config drive backend failure: {0:#}")]
    Environment(#[source] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConfigDriveError {
    pub fn is_not_existing_metadata(&self) -> bool {
        matches!(self, ConfigDriveError::NotExistingMetadata { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, ConfigDriveError::Configuration { .. })
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, ConfigDriveError::InvalidState { .. })
    }
}

impl From<anyhow::Error> for ConfigDriveError {
    fn from(e: anyhow::Error) -> Self {
        ConfigDriveError::Environment(e)
    }
}
