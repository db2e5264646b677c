// SPDX-License-Identifier: MIT

use std::io::{Read, Seek, SeekFrom};

use crate::{DriveIO, DriveIOError, DriveIOResult};

/// `DriveIO` over anything seekable: image files and raw block devices.
#[derive(Debug)]
pub struct StdDriveIO<'a, T: Read + Seek> {
    io: &'a mut T,
    volume_offset: u64,
}

impl<'a, T: Read + Seek> StdDriveIO<'a, T> {
    #[inline]
    pub fn new(io: &'a mut T) -> Self {
        Self {
            io,
            volume_offset: 0,
        }
    }

    #[inline]
    pub fn new_with_offset(io: &'a mut T, volume_offset: u64) -> Self {
        Self { io, volume_offset }
    }
}

impl<'a, T: Read + Seek> DriveIO for StdDriveIO<'a, T> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> DriveIOResult {
        let abs_offset = self
            .volume_offset
            .checked_add(offset)
            .ok_or(DriveIOError::OutOfBounds)?;
        self.io.seek(SeekFrom::Start(abs_offset))?;
        self.io.read_exact(buf)?;
        Ok(())
    }

    // Seeking to the end reports the size of block devices as well as files.
    fn len(&mut self) -> DriveIOResult<u64> {
        let end = self.io.seek(SeekFrom::End(0))?;
        Ok(end.saturating_sub(self.volume_offset))
    }
}
