//! Mount root resolution for a single configured path

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Find the directory that must be mounted for `path` to be usable.
///
/// Returns the path itself for a directory and the parent for anything
/// else that exists. Config values often name files or directories a build
/// creates later, so a missing path walks up to its nearest existing
/// ancestor. `None` means nothing needs mounting: no ancestor exists, or the
/// path could not be inspected.
///
/// The result never has a trailing separator.
pub fn resolve_mount_root(path: &Path) -> Option<PathBuf> {
    let mut current = normalize(path);

    loop {
        match std::fs::metadata(&current) {
            Ok(meta) if meta.is_dir() => return Some(current),
            Ok(_) => return current.parent().map(Path::to_path_buf),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                current = current.parent()?.to_path_buf();
            }
            Err(e) => {
                debug!("Not mounting {}: {}", current.display(), e);
                return None;
            }
        }
    }
}

/// Lexically normalize `path`: `.` segments and trailing separators are
/// dropped, `..` removes the preceding segment. `..` at the root stays at
/// the root. The filesystem is not consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}
