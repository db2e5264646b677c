// SPDX-License-Identifier: MIT

//! Read-only positional IO over images and block devices.

pub mod errors;
mod macros;

#[cfg(feature = "mem")]
mod mem;

#[cfg(feature = "std")]
mod std_io;

pub mod prelude {
    pub use super::DriveIO;
    pub use super::DriveIOExt;
    pub use super::DriveIOStructExt;
    pub use super::errors::*;

    #[cfg(feature = "mem")]
    pub use super::mem::MemDriveIO;

    #[cfg(feature = "std")]
    pub use super::std_io::StdDriveIO;
}

use errors::*;

/// Largest structure `read_struct` decodes. Covers an ISO 9660 sector.
pub const BLOCK_BUF_SIZE: usize = 4096;

/// Read-only positional IO.
///
/// Implementations may target RAM, image files or raw block devices
/// (`/dev/sr0`, `/dev/vdb1`, ...). Probing never writes to a drive.
pub trait DriveIO {
    /// Reads exactly `buf.len()` bytes from `offset` (absolute).
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> DriveIOResult;

    /// Total readable size in bytes.
    fn len(&mut self) -> DriveIOResult<u64>;

    /// True when nothing can be read.
    fn is_empty(&mut self) -> DriveIOResult<bool> {
        Ok(self.len()? == 0)
    }

    /// True if `len` bytes starting at `offset` lie inside the device.
    fn contains(&mut self, offset: u64, len: usize) -> DriveIOResult<bool> {
        let end = offset
            .checked_add(len as u64)
            .ok_or(DriveIOError::OutOfBounds)?;
        Ok(end <= self.len()?)
    }
}

/// Extension helpers for DriveIO.
pub trait DriveIOExt: DriveIO {
    // read_u16_at, read_u32_at
    driveio_impl_primitive_read!(u16, u32);
}

impl<T: DriveIO + ?Sized> DriveIOExt for T {}

/// Reads on-disk structures with zerocopy.
pub trait DriveIOStructExt: DriveIO {
    /// Reads a struct of type `T` from the given offset.
    fn read_struct<T: zerocopy::FromBytes + zerocopy::KnownLayout + zerocopy::Immutable>(
        &mut self,
        offset: u64,
    ) -> DriveIOResult<T> {
        let size = core::mem::size_of::<T>();
        if size > BLOCK_BUF_SIZE {
            return Err(DriveIOError::Other("read_struct: type too large"));
        }
        let mut buf = [0u8; BLOCK_BUF_SIZE];
        self.read_at(offset, &mut buf[..size])?;
        T::read_from_bytes(&buf[..size]).map_err(|_| DriveIOError::Other("read_struct failed"))
    }
}

impl<T: DriveIO + ?Sized> DriveIOStructExt for T {}

impl<T: DriveIO + ?Sized> DriveIO for &mut T {
    #[inline]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> DriveIOResult {
        (**self).read_at(offset, buf)
    }

    #[inline]
    fn len(&mut self) -> DriveIOResult<u64> {
        (**self).len()
    }
}
