//! Import target resolution
//!
//! Targets are resolved lexically against the importing file's directory, the
//! same way `path.join(dirname(importer), target)` behaves: `.` segments are
//! dropped and `..` pops the previous segment. Symlinks are not followed, so
//! two spellings of one file only compare equal after normalization.

use std::path::{Component, Path, PathBuf};

/// Resolve a raw import target written in `importer`
pub fn resolve_import(importer: &Path, target: &str) -> PathBuf {
    let base = importer.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&base.join(target))
}

/// Make `path` absolute against `base_dir` and normalize it
pub fn absolutize(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base_dir.join(path))
    }
}

/// Lexically normalize a path without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    // Leading `..` of a relative path has nothing to cancel
                    normalized.push("..");
                }
            }
            Component::Normal(segment) => normalized.push(segment),
        }
    }
    normalized
}
