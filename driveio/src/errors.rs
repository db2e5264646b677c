// SPDX-License-Identifier: MIT

use core::fmt;

/// Result type for DriveIO operations.
pub type DriveIOResult<T = ()> = core::result::Result<T, DriveIOError>;

/// Error type for DriveIO operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveIOError {
    /// Underlying device or file error.
    Io(std::io::ErrorKind),
    /// Attempted to read past the end of the device.
    OutOfBounds,
    Other(&'static str),
}

impl DriveIOError {
    pub fn msg(&self) -> &'static str {
        match self {
            DriveIOError::Io(_) => "I/O error",
            DriveIOError::OutOfBounds => "Out of bounds",
            DriveIOError::Other(msg) => msg,
        }
    }

    /// Short reads at the end of a device surface as `UnexpectedEof`.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            DriveIOError::OutOfBounds | DriveIOError::Io(std::io::ErrorKind::UnexpectedEof)
        )
    }
}

impl From<&'static str> for DriveIOError {
    #[inline]
    fn from(msg: &'static str) -> Self {
        DriveIOError::Other(msg)
    }
}

impl From<std::io::Error> for DriveIOError {
    #[cold]
    #[inline(never)]
    fn from(e: std::io::Error) -> Self {
        DriveIOError::Io(e.kind())
    }
}

impl fmt::Display for DriveIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveIOError::Io(kind) => write!(f, "{}: {kind}", self.msg()),
            _ => write!(f, "{}", self.msg()),
        }
    }
}

impl std::error::Error for DriveIOError {}
