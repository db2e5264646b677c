// SPDX-License-Identifier: MIT

use crate::{DriveIO, DriveIOError, DriveIOResult};

/// In-memory implementation of `DriveIO`.
///
/// Useful for tests and for images already loaded in RAM.
#[derive(Debug)]
pub struct MemDriveIO<'a> {
    buffer: &'a [u8],
    volume_offset: u64,
}

impl<'a> MemDriveIO<'a> {
    #[inline]
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            volume_offset: 0,
        }
    }

    /// View of a volume starting `volume_offset` bytes into `buffer`.
    #[inline]
    pub fn new_with_offset(buffer: &'a [u8], volume_offset: u64) -> Self {
        Self {
            buffer,
            volume_offset,
        }
    }

    #[inline]
    fn check_bounds(&self, abs_off: u64, len: usize) -> DriveIOResult {
        let end = abs_off
            .checked_add(len as u64)
            .ok_or(DriveIOError::OutOfBounds)?;
        if end > self.buffer.len() as u64 {
            return Err(DriveIOError::OutOfBounds);
        }
        Ok(())
    }
}

impl<'a> DriveIO for MemDriveIO<'a> {
    #[inline(always)]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> DriveIOResult {
        let abs_offset = self
            .volume_offset
            .checked_add(offset)
            .ok_or(DriveIOError::OutOfBounds)?;
        self.check_bounds(abs_offset, buf.len())?;
        let start = abs_offset as usize;
        buf.copy_from_slice(&self.buffer[start..start + buf.len()]);
        Ok(())
    }

    #[inline]
    fn len(&mut self) -> DriveIOResult<u64> {
        Ok((self.buffer.len() as u64).saturating_sub(self.volume_offset))
    }
}
