//! Configuration schema for mixpod
//!
//! Configuration is read from `mixpod.toml` in the working directory, or
//! `~/.config/mixpod/config.toml` when no local file exists.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upstream version value that is resolved against the upstream server
pub const LATEST_VERSION: &str = "latest";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build host paths
    pub builder: BuilderConfig,

    /// Local mix content paths
    pub mixer: MixerConfig,

    /// Upstream content source
    pub upstream: UpstreamConfig,

    /// Container runtime settings
    pub container: ContainerSettings,
}

impl Config {
    /// Every path-valued field that may need to be visible inside the
    /// container, by config key.
    ///
    /// New path fields must be added here to be mounted.
    pub fn mount_fields(&self) -> [(&'static str, &str); 8] {
        [
            ("builder.cert", self.builder.cert.as_str()),
            ("builder.server_state_dir", self.builder.server_state_dir.as_str()),
            ("builder.version_path", self.builder.version_path.as_str()),
            ("builder.yum_conf", self.builder.yum_conf.as_str()),
            ("mixer.local_bundle_dir", self.mixer.local_bundle_dir.as_str()),
            ("mixer.local_repo_dir", self.mixer.local_repo_dir.as_str()),
            ("mixer.local_rpm_dir", self.mixer.local_rpm_dir.as_str()),
            ("mixer.os_release_path", self.mixer.os_release_path.as_str()),
        ]
    }
}

/// Paths used by the build host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Signing certificate
    pub cert: String,

    /// Directory holding update content produced by the build
    pub server_state_dir: String,

    /// Directory holding the mix version files
    pub version_path: String,

    /// Package manager configuration file
    pub yum_conf: String,
}

/// Paths to locally maintained mix content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    /// Local bundle definitions
    pub local_bundle_dir: String,

    /// Local package repository
    pub local_repo_dir: String,

    /// Local packages to import into the repository
    pub local_rpm_dir: String,

    /// os-release file used for the mix
    pub os_release_path: String,
}

/// Upstream content source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream content server
    pub url: String,

    /// Upstream release the mix is based on, or "latest"
    pub version: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://cdn.download.clearlinux.org".to_string(),
            version: LATEST_VERSION.to_string(),
        }
    }
}

/// Container runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Docker-compatible runtime binary (docker or podman)
    pub runtime: String,

    /// Image repository; the upstream format is used as tag
    pub image_repository: String,

    /// Root for per-format build directories (default: `<cwd>/docker`)
    pub work_root: Option<PathBuf>,

    /// File holding the host's own format
    pub host_format_path: PathBuf,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            runtime: "docker".to_string(),
            image_repository: "mixer-tools/mixer".to_string(),
            work_root: None,
            host_format_path: PathBuf::from("/usr/share/defaults/swupd/format"),
        }
    }
}
