// SPDX-License-Identifier: MIT

use core::fmt;

use driveio::errors::*;

/// Error type for volume probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    IO(DriveIOError),
    Invalid(&'static str),
}

impl From<DriveIOError> for ProbeError {
    fn from(e: DriveIOError) -> Self {
        ProbeError::IO(e)
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::IO(e) => write!(f, "probe: {e}"),
            ProbeError::Invalid(msg) => write!(f, "probe: {msg}"),
        }
    }
}

impl std::error::Error for ProbeError {}

pub type ProbeResult<T = ()> = Result<T, ProbeError>;

/// Maps "structure lies past the end of the device" to `Ok(None)`.
///
/// A drive too small to hold a descriptor simply does not carry one.
pub(crate) fn absent_if_short<T>(res: DriveIOResult<T>) -> ProbeResult<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_out_of_bounds() => Ok(None),
        Err(e) => Err(e.into()),
    }
}
