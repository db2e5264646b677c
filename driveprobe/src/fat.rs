// SPDX-License-Identifier: MIT

//! FAT boot sector detection (vfat config drives).

use driveio::prelude::*;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::errors::*;
use crate::utils::{decode_label, encode_label};

pub const FAT_BOOT_SECTOR_SIZE: usize = 512;
pub const FAT_SIGNATURE: u16 = 0xAA55;
pub const FAT_SIGNATURE_OFFSET: u64 = 510;
pub const FAT_EXT_BOOT_SIGNATURE: u8 = 0x29;
pub const FAT_BPB_SIZE: u64 = 36;

/// Common BIOS parameter block shared by FAT12/16/32.
#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug)]
#[repr(C, packed)]
pub struct FatBpb {
    pub jump_boot: [u8; 3],
    pub oem_name: [u8; 8],
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub num_fats: u8,
    pub root_entry_count: u16,
    pub total_sectors_16: u16,
    pub media: u8,
    pub fat_size_16: u16,
    pub sectors_per_track: u16,
    pub num_heads: u16,
    pub hidden_sectors: u32,
    pub total_sectors_32: u32,
}

/// FAT12/16 extended BPB (offset 36).
#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug)]
#[repr(C, packed)]
pub struct Fat16ExtBpb {
    pub drive_number: u8,
    pub reserved1: u8,
    pub boot_signature: u8,
    pub volume_id: u32,
    pub volume_label: [u8; 11],
    pub fs_type: [u8; 8],
}

/// FAT32 extended BPB (offset 36).
#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug)]
#[repr(C, packed)]
pub struct Fat32ExtBpb {
    pub fat_size_32: u32,
    pub ext_flags: u16,
    pub fs_version: u16,
    pub root_cluster: u32,
    pub fsinfo_sector: u16,
    pub backup_boot_sector: u16,
    pub reserved: [u8; 12],
    pub drive_number: u8,
    pub reserved1: u8,
    pub boot_signature: u8,
    pub volume_id: u32,
    pub volume_label: [u8; 11],
    pub fs_type: [u8; 8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatType {
    Fat12,
    Fat16,
    Fat32,
}

impl core::fmt::Display for FatType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            FatType::Fat12 => "FAT12",
            FatType::Fat16 => "FAT16",
            FatType::Fat32 => "FAT32",
        };
        write!(f, "{s}")
    }
}

/// What the boot sector says about the volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatVolume {
    pub fat_type: FatType,
    pub label: String,
    pub volume_id: u32,
}

impl FatBpb {
    /// Boot sector geometry a formatter would produce.
    pub fn is_plausible(&self) -> bool {
        let bps = self.bytes_per_sector;
        let spc = self.sectors_per_cluster;
        let reserved = self.reserved_sectors;
        matches!(bps, 512 | 1024 | 2048 | 4096)
            && spc.is_power_of_two()
            && reserved != 0
            && self.num_fats != 0
    }

    /// FAT32 volumes have no fixed root directory and no 16-bit FAT size.
    #[inline]
    pub fn is_fat32_layout(&self) -> bool {
        let root_entries = self.root_entry_count;
        let fat_size = self.fat_size_16;
        root_entries == 0 && fat_size == 0
    }

    /// A BPB for test images: 512-byte sectors, 2 FATs.
    pub fn new(fat32: bool) -> Self {
        Self {
            jump_boot: [0xEB, 0x58, 0x90],
            oem_name: *b"mkfs.fat",
            bytes_per_sector: 512,
            sectors_per_cluster: if fat32 { 1 } else { 4 },
            reserved_sectors: if fat32 { 32 } else { 4 },
            num_fats: 2,
            root_entry_count: if fat32 { 0 } else { 512 },
            total_sectors_16: 0,
            media: 0xF8,
            fat_size_16: if fat32 { 0 } else { 32 },
            sectors_per_track: 32,
            num_heads: 64,
            hidden_sectors: 0,
            total_sectors_32: 131_072,
        }
    }
}

impl Fat16ExtBpb {
    pub fn new(label: &str, volume_id: u32) -> Self {
        Self {
            drive_number: 0x80,
            reserved1: 0,
            boot_signature: FAT_EXT_BOOT_SIGNATURE,
            volume_id,
            volume_label: encode_label(label),
            fs_type: *b"FAT16   ",
        }
    }
}

impl Fat32ExtBpb {
    pub fn new(label: &str, volume_id: u32) -> Self {
        Self {
            fat_size_32: 1009,
            ext_flags: 0,
            fs_version: 0,
            root_cluster: 2,
            fsinfo_sector: 1,
            backup_boot_sector: 6,
            reserved: [0; 12],
            drive_number: 0x80,
            reserved1: 0,
            boot_signature: FAT_EXT_BOOT_SIGNATURE,
            volume_id,
            volume_label: encode_label(label),
            fs_type: *b"FAT32   ",
        }
    }
}

fn fat_type_from_tag(tag: &[u8; 8], fat32_layout: bool) -> Option<FatType> {
    if fat32_layout {
        return (tag == b"FAT32   ").then_some(FatType::Fat32);
    }
    match tag {
        b"FAT12   " => Some(FatType::Fat12),
        b"FAT16   " | b"FAT     " => Some(FatType::Fat16),
        _ => None,
    }
}

/// Reads the boot sector and returns the FAT volume it describes.
///
/// `Ok(None)` when sector 0 is not a FAT boot sector, or when the extended
/// BPB carries no label (boot signature other than 0x29).
pub fn read_fat_volume<IO: DriveIO + ?Sized>(io: &mut IO) -> ProbeResult<Option<FatVolume>> {
    if !io.contains(0, FAT_BOOT_SECTOR_SIZE)? {
        return Ok(None);
    }

    if io.read_u16_at(FAT_SIGNATURE_OFFSET)? != FAT_SIGNATURE {
        return Ok(None);
    }

    let bpb: FatBpb = io.read_struct(0)?;
    if !bpb.is_plausible() {
        return Ok(None);
    }

    let fat32_layout = bpb.is_fat32_layout();
    let (boot_signature, raw_label, volume_id, fs_type) = if fat32_layout {
        let ext: Fat32ExtBpb = io.read_struct(FAT_BPB_SIZE)?;
        (ext.boot_signature, ext.volume_label, ext.volume_id, ext.fs_type)
    } else {
        let ext: Fat16ExtBpb = io.read_struct(FAT_BPB_SIZE)?;
        (ext.boot_signature, ext.volume_label, ext.volume_id, ext.fs_type)
    };

    if boot_signature != FAT_EXT_BOOT_SIGNATURE {
        return Ok(None);
    }

    let Some(fat_type) = fat_type_from_tag(&fs_type, fat32_layout) else {
        return Ok(None);
    };

    Ok(Some(FatVolume {
        fat_type,
        label: decode_label(&raw_label),
        volume_id,
    }))
}
