// SPDX-License-Identifier: MIT

use std::path::Path;

use crate::locator::device::BlockDevice;
use crate::types::ContentFormat;

/// Copies the content of a detected config drive into a directory.
pub trait VolumeExtractor: Send + Sync {
    /// Returns the number of files written under `target`.
    fn extract(
        &self,
        device: &BlockDevice,
        format: ContentFormat,
        target: &Path,
    ) -> anyhow::Result<u64>;
}

#[cfg(all(target_os = "linux", feature = "host-mount"))]
pub use mount::MountExtractor;

#[cfg(all(target_os = "linux", feature = "host-mount"))]
mod mount {
    use std::path::Path;
    use std::process::Command;

    use anyhow::Context;

    use super::VolumeExtractor;
    use crate::locator::copy::copy_tree;
    use crate::locator::device::BlockDevice;
    use crate::types::ContentFormat;

    /// Mounts the device read-only with the host's `mount` and copies its
    /// tree out. Needs root.
    #[derive(Debug, Clone, Default)]
    pub struct MountExtractor {}

    impl MountExtractor {
        pub const REQUIRED_BINARIES: [&'static str; 2] = ["mount", "umount"];

        pub fn new() -> anyhow::Result<Self> {
            Self::validate_binaries()?;
            Ok(Self {})
        }

        fn validate_binaries() -> anyhow::Result<()> {
            let missing: Vec<_> = Self::REQUIRED_BINARIES
                .iter()
                .copied()
                .filter(|b| which::which(b).is_err())
                .collect();

            if !missing.is_empty() {
                anyhow::bail!(
                    "Missing required tool(s) for mounting config drives: {}",
                    missing.join(", ")
                );
            }

            Ok(())
        }

        pub fn fs_type(format: ContentFormat) -> &'static str {
            match format {
                ContentFormat::Iso => "iso9660",
                ContentFormat::Vfat => "vfat",
            }
        }
    }

    fn run(cmd: &mut Command) -> anyhow::Result<()> {
        let status = cmd
            .status()
            .with_context(|| format!("failed to spawn {cmd:?}"))?;

        if !status.success() {
            anyhow::bail!("{cmd:?} failed with exit code: {:?}", status.code());
        }

        Ok(())
    }

    impl VolumeExtractor for MountExtractor {
        fn extract(
            &self,
            device: &BlockDevice,
            format: ContentFormat,
            target: &Path,
        ) -> anyhow::Result<u64> {
            let mount_point = tempfile::Builder::new()
                .prefix("configdrive-mnt-")
                .tempdir()
                .context("cannot create mount point")?;

            run(Command::new("mount")
                .args(["-o", "ro", "-t", Self::fs_type(format)])
                .arg(&device.dev_path)
                .arg(mount_point.path()))?;
            tracing::debug!(device = %device.dev_path.display(), "mounted config drive");

            // Unmount even when the copy fails.
            let copied = copy_tree(mount_point.path(), target);
            let unmounted = run(Command::new("umount").arg(mount_point.path()));

            let copied = copied.with_context(|| {
                format!(
                    "failed to copy config drive content from {}",
                    device.dev_path.display()
                )
            })?;
            unmounted?;
            Ok(copied)
        }
    }

}
