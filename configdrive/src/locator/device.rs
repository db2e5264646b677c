// SPDX-License-Identifier: MIT

//! Block device enumeration from sysfs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::SearchLocation;

pub const SYS_CLASS_BLOCK: &str = "/sys/class/block";
pub const DEV_ROOT: &str = "/dev";

/// SCSI peripheral device type of CD/DVD drives.
const SCSI_TYPE_ROM: &str = "5";

/// Kernel devices that never carry a config drive.
const IGNORED_PREFIXES: [&str; 3] = ["loop", "ram", "zram"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeviceClass {
    Optical,
    Disk,
    Partition,
}

impl DeviceClass {
    pub fn location(&self) -> SearchLocation {
        match self {
            DeviceClass::Optical => SearchLocation::Cdrom,
            DeviceClass::Disk => SearchLocation::Hdd,
            DeviceClass::Partition => SearchLocation::Partition,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    /// Kernel name (`sr0`, `vdb`, `vdb1`)
    pub name: String,
    /// Device node to open
    pub dev_path: PathBuf,
    pub class: DeviceClass,
}

impl BlockDevice {
    pub fn matches(&self, location: SearchLocation) -> bool {
        self.class.location() == location
    }
}

impl core::fmt::Display for BlockDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({:?})", self.dev_path.display(), self.class)
    }
}

/// Classifies one `/sys/class/block/<name>` entry.
pub fn classify(sys_entry: &Path, name: &str) -> Option<DeviceClass> {
    if IGNORED_PREFIXES.iter().any(|p| name.starts_with(p)) {
        return None;
    }
    if sys_entry.join("partition").exists() {
        return Some(DeviceClass::Partition);
    }
    let scsi_type = fs::read_to_string(sys_entry.join("device").join("type")).unwrap_or_default();
    if name.starts_with("sr") || scsi_type.trim() == SCSI_TYPE_ROM {
        return Some(DeviceClass::Optical);
    }
    Some(DeviceClass::Disk)
}

/// Lists block devices under `sys_block`, sorted by name.
pub fn enumerate_block_devices(sys_block: &Path, dev_root: &Path) -> io::Result<Vec<BlockDevice>> {
    let mut devices = Vec::new();

    for entry in fs::read_dir(sys_block)? {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if let Some(class) = classify(&entry.path(), &name) {
            devices.push(BlockDevice {
                dev_path: dev_root.join(&name),
                name,
                class,
            });
        }
    }

    devices.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(devices)
}
