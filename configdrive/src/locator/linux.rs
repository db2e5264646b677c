// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use driveio::prelude::*;
use driveprobe::{CONFIG_DRIVE_LABEL, ProbeOptions, VolumeInfo, probe_volume};

use crate::error::Result;
use crate::locator::device::{BlockDevice, DEV_ROOT, SYS_CLASS_BLOCK, enumerate_block_devices};
use crate::locator::extract::VolumeExtractor;
use crate::locator::{ConfigDriveLocator, DiscoveryResult, allocate_working_dir};
use crate::request::SearchRequest;
use crate::types::ContentFormat;

/// Scans optical drives, disks and partitions listed in sysfs for a
/// volume labelled `config-2`.
pub struct LinuxLocator {
    sys_block: PathBuf,
    dev_root: PathBuf,
    label: String,
    target_path: PathBuf,
    extractor: Box<dyn VolumeExtractor>,
}

impl LinuxLocator {
    #[cfg(feature = "host-mount")]
    pub fn new() -> Result<Self> {
        let extractor = crate::locator::extract::MountExtractor::new()?;
        Self::with_extractor(Box::new(extractor))
    }

    pub fn with_extractor(extractor: Box<dyn VolumeExtractor>) -> Result<Self> {
        Ok(Self {
            sys_block: PathBuf::from(SYS_CLASS_BLOCK),
            dev_root: PathBuf::from(DEV_ROOT),
            label: CONFIG_DRIVE_LABEL.to_string(),
            target_path: allocate_working_dir()?,
            extractor,
        })
    }

    /// Alternative sysfs block class directory and device node root.
    pub fn with_sysfs(mut self, sys_block: impl Into<PathBuf>, dev_root: impl Into<PathBuf>) -> Self {
        self.sys_block = sys_block.into();
        self.dev_root = dev_root.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Unreadable devices (no medium, permission denied) are skipped.
    fn probe(&self, device: &BlockDevice, format: ContentFormat) -> Option<VolumeInfo> {
        let opts = match format {
            ContentFormat::Iso => ProbeOptions::new().no_fat(),
            ContentFormat::Vfat => ProbeOptions::new().no_iso(),
        };

        let mut file = match File::open(&device.dev_path) {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(device = %device, error = %e, "cannot open device");
                return None;
            }
        };

        let mut io = StdDriveIO::new(&mut file);
        match probe_volume(&mut io, opts) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(device = %device, error = %e, "cannot probe device");
                None
            }
        }
    }

    fn reset_target(&self) -> std::io::Result<()> {
        let _ = fs::remove_dir_all(&self.target_path);
        fs::create_dir_all(&self.target_path)
    }

    fn extract(&self, device: &BlockDevice, format: ContentFormat) -> Option<u64> {
        match self.extractor.extract(device, format, &self.target_path) {
            Ok(files) => Some(files),
            Err(e) => {
                tracing::warn!(device = %device, error = %format!("{e:#}"), "config drive extraction failed");
                if let Err(e) = self.reset_target() {
                    tracing::warn!(error = %e, "cannot reset working directory");
                }
                None
            }
        }
    }
}

impl ConfigDriveLocator for LinuxLocator {
    fn locate(&mut self, request: &SearchRequest) -> Result<DiscoveryResult> {
        if request.is_empty() {
            tracing::debug!("empty config drive search space");
            return Ok(DiscoveryResult::NotFound);
        }

        let devices = enumerate_block_devices(&self.sys_block, &self.dev_root)
            .with_context(|| format!("cannot list block devices in {}", self.sys_block.display()))?;

        for (format, location) in request.pairs() {
            tracing::debug!(%format, %location, "searching config drive");

            for device in devices.iter().filter(|d| d.matches(location)) {
                let Some(volume) = self.probe(device, format) else {
                    continue;
                };
                if !volume.matches_label(&self.label) {
                    tracing::debug!(device = %device, label = %volume.label, "label mismatch");
                    continue;
                }

                tracing::info!(device = %device, %volume, "config drive found");
                if let Some(files) = self.extract(device, format) {
                    tracing::debug!(files, target = %self.target_path.display(), "config drive copied");
                    return Ok(DiscoveryResult::Found {
                        working_dir: self.target_path.clone(),
                    });
                }
            }
        }

        Ok(DiscoveryResult::NotFound)
    }

    fn target_path(&self) -> &Path {
        &self.target_path
    }
}
