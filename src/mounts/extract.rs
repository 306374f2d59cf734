//! Mount set derived from the build configuration

use crate::config::Config;
use crate::mounts::reduce::MountSet;
use crate::mounts::resolve::{normalize, resolve_mount_root};
use std::path::Path;
use tracing::debug;

/// Compute the directories to bind-mount for `config`.
///
/// The working directory is always mounted. Every field listed by
/// [`Config::mount_fields`] is resolved to its mount root; empty, relative
/// and unresolvable values are skipped.
pub fn config_mounts(config: &Config, cwd: &Path) -> MountSet {
    let cwd = normalize(cwd);
    let mut candidates = vec![cwd.to_string_lossy().into_owned()];

    for (field, value) in config.mount_fields() {
        if value.is_empty() {
            continue;
        }

        let path = Path::new(value);
        if !path.is_absolute() {
            debug!("Skipping {} = {:?}: not an absolute path", field, value);
            continue;
        }

        match resolve_mount_root(path) {
            Some(root) => {
                debug!("Mount for {}: {}", field, root.display());
                candidates.push(root.to_string_lossy().into_owned());
            }
            None => debug!("No mount needed for {}", field),
        }
    }

    MountSet::reduce(candidates)
}
