// SPDX-License-Identifier: MIT

use driveio::prelude::*;

use crate::{
    errors::*,
    fat::{self, FatType},
    iso,
};

/// Probe options
#[derive(Clone, Copy, Debug)]
pub struct ProbeOptions {
    /// Look for an ISO 9660 volume descriptor set
    pub iso: bool,
    /// Look for a FAT boot sector
    pub fat: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            iso: true,
            fat: true,
        }
    }
}

impl ProbeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_iso(mut self) -> Self {
        self.iso = false;
        self
    }

    pub fn no_fat(mut self) -> Self {
        self.fat = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeKind {
    Iso9660,
    Fat(FatType),
}

impl VolumeKind {
    #[inline]
    pub fn is_iso(&self) -> bool {
        matches!(self, VolumeKind::Iso9660)
    }

    #[inline]
    pub fn is_fat(&self) -> bool {
        matches!(self, VolumeKind::Fat(_))
    }
}

impl core::fmt::Display for VolumeKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            VolumeKind::Iso9660 => write!(f, "ISO 9660"),
            VolumeKind::Fat(t) => write!(f, "{t}"),
        }
    }
}

/// A labelled volume found on a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    pub kind: VolumeKind,
    pub label: String,
    pub size_bytes: u64,
}

impl VolumeInfo {
    /// Labels compare case-insensitively: FAT tools upper-case them.
    pub fn matches_label(&self, label: &str) -> bool {
        self.label.eq_ignore_ascii_case(label)
    }
}

impl core::fmt::Display for VolumeInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} volume '{}' ({} bytes)",
            self.kind, self.label, self.size_bytes
        )
    }
}

/// Main probe: ISO 9660 first, then FAT.
///
/// Raw ISO bytes can sit on a disk that also carries a stale boot sector,
/// so the descriptor set wins when both are present.
pub fn probe_volume<IO: DriveIO + ?Sized>(
    io: &mut IO,
    opts: ProbeOptions,
) -> ProbeResult<Option<VolumeInfo>> {
    let size_bytes = io.len()?;

    if opts.iso
        && let Some(pvd) = iso::read_primary_descriptor(io)?
    {
        return Ok(Some(VolumeInfo {
            kind: VolumeKind::Iso9660,
            label: pvd.label(),
            size_bytes,
        }));
    }

    if opts.fat
        && let Some(vol) = fat::read_fat_volume(io)?
    {
        return Ok(Some(VolumeInfo {
            kind: VolumeKind::Fat(vol.fat_type),
            label: vol.label,
            size_bytes,
        }));
    }

    Ok(None)
}
