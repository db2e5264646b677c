// SPDX-License-Identifier: MIT

//! ISO 9660 volume descriptor detection.
//!
//! The volume descriptor set starts at logical sector 16 (2048-byte
//! sectors) and ends with a set terminator. Only the head of each
//! descriptor is read: type, standard identifier, version and the
//! volume identifier that carries the drive label.

use driveio::prelude::*;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::errors::*;
use crate::utils::{decode_label, encode_label};

pub const ISO_SECTOR_SIZE: u64 = 2048;
pub const ISO_DESCRIPTOR_START_LBA: u64 = 16;
pub const ISO_STANDARD_ID: [u8; 5] = *b"CD001";
pub const ISO_DESCRIPTOR_VERSION: u8 = 1;

pub const ISO_VD_BOOT_RECORD: u8 = 0;
pub const ISO_VD_PRIMARY: u8 = 1;
pub const ISO_VD_SUPPLEMENTARY: u8 = 2;
pub const ISO_VD_TERMINATOR: u8 = 255;

/// Upper bound on descriptors walked before giving up on a terminator.
const MAX_DESCRIPTORS: u64 = 32;

#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct IsoDescriptorHead {
    pub vd_type: u8,
    pub standard_id: [u8; 5],
    pub version: u8,
    pub unused: u8,
    pub system_id: [u8; 32],
    pub volume_id: [u8; 32],
}

impl IsoDescriptorHead {
    /// A primary volume descriptor head labelled `volume_id` (space padded).
    pub fn primary(volume_id: &str) -> Self {
        Self {
            vd_type: ISO_VD_PRIMARY,
            standard_id: ISO_STANDARD_ID,
            version: ISO_DESCRIPTOR_VERSION,
            unused: 0,
            system_id: [b' '; 32],
            volume_id: encode_label(volume_id),
        }
    }

    pub fn terminator() -> Self {
        Self {
            vd_type: ISO_VD_TERMINATOR,
            standard_id: ISO_STANDARD_ID,
            version: ISO_DESCRIPTOR_VERSION,
            unused: 0,
            system_id: [0; 32],
            volume_id: [0; 32],
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.standard_id == ISO_STANDARD_ID && self.version == ISO_DESCRIPTOR_VERSION
    }

    pub fn label(&self) -> String {
        decode_label(&self.volume_id)
    }
}

/// Byte offset of the descriptor at `index` in the set.
#[inline]
pub fn descriptor_offset(index: u64) -> u64 {
    (ISO_DESCRIPTOR_START_LBA + index) * ISO_SECTOR_SIZE
}

/// Walks the volume descriptor set and returns the primary descriptor.
///
/// `Ok(None)` when the device holds no ISO 9660 structure.
pub fn read_primary_descriptor<IO: DriveIO + ?Sized>(
    io: &mut IO,
) -> ProbeResult<Option<IsoDescriptorHead>> {
    for index in 0..MAX_DESCRIPTORS {
        let head = match absent_if_short(io.read_struct::<IsoDescriptorHead>(descriptor_offset(index)))? {
            Some(head) => head,
            None => return Ok(None),
        };

        if !head.is_valid() {
            // The first slot decides whether this is ISO at all; a broken
            // descriptor later in the set ends the walk.
            return Ok(None);
        }

        match head.vd_type {
            ISO_VD_PRIMARY => return Ok(Some(head)),
            ISO_VD_TERMINATOR => return Ok(None),
            _ => continue,
        }
    }

    Err(ProbeError::Invalid("ISO 9660: descriptor set not terminated"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tests::write_at;

    fn image_with(descriptors: &[IsoDescriptorHead]) -> Vec<u8> {
        let mut buf = vec![0u8; descriptor_offset(descriptors.len() as u64 + 1) as usize];
        for (i, d) in descriptors.iter().enumerate() {
            write_at(&mut buf, descriptor_offset(i as u64), d.as_bytes());
        }
        buf
    }

    #[test]
    fn primary_descriptor_label() {
        let buf = image_with(&[
            IsoDescriptorHead::primary("config-2"),
            IsoDescriptorHead::terminator(),
        ]);
        let mut io = MemDriveIO::new(&buf);

        let pvd = read_primary_descriptor(&mut io).unwrap().unwrap();
        assert_eq!(pvd.label(), "config-2");
    }

    #[test]
    fn boot_record_before_primary() {
        let mut boot = IsoDescriptorHead::primary("");
        boot.vd_type = ISO_VD_BOOT_RECORD;
        let buf = image_with(&[
            boot,
            IsoDescriptorHead::primary("CONFIG-2"),
            IsoDescriptorHead::terminator(),
        ]);
        let mut io = MemDriveIO::new(&buf);

        let pvd = read_primary_descriptor(&mut io).unwrap().unwrap();
        assert_eq!(pvd.label(), "CONFIG-2");
    }

    #[test]
    fn terminator_without_primary() {
        let buf = image_with(&[IsoDescriptorHead::terminator()]);
        let mut io = MemDriveIO::new(&buf);
        assert!(read_primary_descriptor(&mut io).unwrap().is_none());
    }

    #[test]
    fn small_or_blank_device() {
        let small = vec![0u8; 4096];
        assert!(read_primary_descriptor(&mut MemDriveIO::new(&small)).unwrap().is_none());

        let blank = vec![0u8; 64 * 1024];
        assert!(read_primary_descriptor(&mut MemDriveIO::new(&blank)).unwrap().is_none());
    }

    #[test]
    fn unterminated_set_is_invalid() {
        let mut boot = IsoDescriptorHead::primary("");
        boot.vd_type = ISO_VD_SUPPLEMENTARY;
        let mut buf = vec![0u8; descriptor_offset(MAX_DESCRIPTORS + 1) as usize];
        for i in 0..MAX_DESCRIPTORS {
            write_at(&mut buf, descriptor_offset(i), boot.as_bytes());
        }
        let mut io = MemDriveIO::new(&buf);
        assert!(matches!(
            read_primary_descriptor(&mut io),
            Err(ProbeError::Invalid(_))
        ));
    }
}
