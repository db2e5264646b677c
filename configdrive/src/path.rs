// SPDX-License-Identifier: MIT

//! Lexical path normalization for metadata lookups.

use std::path::{Component, Path, PathBuf};

/// Joins `relative` onto `base` and collapses `.`, `..` and redundant
/// separators without touching the filesystem.
///
/// This is not a sandbox: `..` segments may climb above `base`, and an
/// absolute `relative` replaces `base` as with [`Path::join`].
pub fn normalize_join(base: &Path, relative: &str) -> PathBuf {
    let joined = base.join(relative);
    let mut out: Vec<Component<'_>> = Vec::new();

    for comp in joined.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            _ => out.push(comp),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}
