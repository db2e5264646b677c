// SPDX-License-Identifier: MIT

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Recursively copies the content of `src` into `dst`. Returns the number
/// of files copied.
///
/// Relative symlinks are recreated as links inside `dst`, so they resolve
/// within the copy. Absolute links would point at the host and are dropped.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<u64> {
    fs::create_dir_all(dst)?;
    let mut copied = 0;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let target = dst.join(entry.file_name());

        if file_type.is_dir() {
            copied += copy_tree(&entry.path(), &target)?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        } else if file_type.is_symlink() {
            copy_link(&entry.path(), &target)?;
        }
    }

    Ok(copied)
}

#[cfg(unix)]
fn copy_link(link: &Path, target: &Path) -> io::Result<()> {
    let dest = fs::read_link(link)?;
    if dest.is_absolute() {
        tracing::debug!(link = %link.display(), dest = %dest.display(), "skipping absolute symlink");
        return Ok(());
    }
    std::os::unix::fs::symlink(dest, target)
}

#[cfg(not(unix))]
fn copy_link(link: &Path, _target: &Path) -> io::Result<()> {
    tracing::debug!(link = %link.display(), "skipping symlink");
    Ok(())
}

/// Files under `root`, relative to it, sorted.
pub fn list_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                walk(root, &path, out)?;
            } else if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_path_buf());
            }
        }
        Ok(())
    }

    let mut out = Vec::new();
    walk(root, root, &mut out)?;
    out.sort();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_nested_tree() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("openstack/latest")).unwrap();
        fs::write(src.path().join("openstack/latest/meta_data.json"), b"{}").unwrap();
        fs::write(src.path().join("openstack/latest/user_data"), b"#!/bin/sh\n").unwrap();
        fs::create_dir_all(src.path().join("ec2")).unwrap();

        let target = dst.path().join("out");
        assert_eq!(copy_tree(src.path(), &target).unwrap(), 2);
        assert_eq!(
            fs::read(target.join("openstack/latest/user_data")).unwrap(),
            b"#!/bin/sh\n"
        );
        assert!(target.join("ec2").is_dir());

        assert_eq!(
            list_files(&target).unwrap(),
            [
                PathBuf::from("openstack/latest/meta_data.json"),
                PathBuf::from("openstack/latest/user_data"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn relative_symlinks_resolve_in_the_copy() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let dated = src.path().join("openstack/2015-10-15");
        fs::create_dir_all(&dated).unwrap();
        fs::write(dated.join("meta_data.json"), br#"{"uuid":"7"}"#).unwrap();
        std::os::unix::fs::symlink("2015-10-15", src.path().join("openstack/latest")).unwrap();
        std::os::unix::fs::symlink("/etc/hostname", src.path().join("host_link")).unwrap();

        let target = dst.path().join("out");
        assert_eq!(copy_tree(src.path(), &target).unwrap(), 1);

        let latest = target.join("openstack/latest");
        assert!(fs::symlink_metadata(&latest).unwrap().file_type().is_symlink());
        assert_eq!(
            fs::read(latest.join("meta_data.json")).unwrap(),
            br#"{"uuid":"7"}"#
        );
        assert!(fs::symlink_metadata(target.join("host_link")).is_err());
    }
}
