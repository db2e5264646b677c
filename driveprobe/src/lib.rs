// SPDX-License-Identifier: MIT

//! Detection of config drive volumes from raw device bytes.
//!
//! Nothing here mounts or unpacks a volume: the probes read the ISO 9660
//! volume descriptor set or the FAT boot sector and report the kind of
//! volume and its label.

pub mod errors;
/// ISO 9660 volume descriptors.
pub mod iso;
/// FAT12/16/32 boot sectors.
pub mod fat;
pub mod scanner;
pub mod utils;

pub use scanner::{ProbeOptions, VolumeInfo, VolumeKind, probe_volume};

/// Label OpenStack and compatible clouds give to config drives.
pub const CONFIG_DRIVE_LABEL: &str = "config-2";
