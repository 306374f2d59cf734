//! Bind-mount planning
//!
//! Turns the path-valued config fields into the smallest set of host
//! directories that must be bind-mounted so a command sees the same paths
//! inside the container as on the host.
//!
//! Each mount is identical on both sides (`-v /p:/p`), so a directory
//! already mounted makes every mount below it redundant.

mod extract;
mod reduce;
mod resolve;

pub use extract::config_mounts;
pub use reduce::MountSet;
pub use resolve::{normalize, resolve_mount_root};
