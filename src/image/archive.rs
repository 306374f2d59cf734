//! Base archive cache
//!
//! The image root filesystem is seeded from an upstream archive. A local
//! copy is reused only while its SHA-512 matches the checksum upstream
//! publishes for the same release.

use crate::error::{MixpodError, MixpodResult};
use crate::upstream::UpstreamSource;
use sha2::{Digest, Sha512};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the base archive inside a build directory
pub const ARCHIVE_FILE: &str = "mixer.tar.xz";

/// Base archive on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseArchive {
    /// Location of the archive
    pub path: PathBuf,
    /// Lowercase hex SHA-512 of the archive bytes
    pub digest: String,
    /// Whether an existing file was reused instead of downloaded
    pub reused: bool,
}

impl BaseArchive {
    /// File name, as referenced from the Dockerfile
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(ARCHIVE_FILE)
    }
}

/// Upstream path of the base archive for `version`
pub fn archive_remote_path(version: &str) -> String {
    format!("/releases/{version}/clear/clear-{version}-mixer.tar.xz")
}

/// Upstream path of the published checksum for the base archive
pub fn checksum_remote_path(version: &str) -> String {
    format!("{}-SHA512SUMS", archive_remote_path(version))
}

/// Make sure `dest_dir` holds a valid base archive for `version`.
///
/// An existing archive is kept when upstream's checksum for the release
/// matches it. If the checksum cannot be fetched or does not match, or no
/// archive exists, the archive is downloaded over the old one.
pub async fn ensure_base_archive(
    upstream: &dyn UpstreamSource,
    version: &str,
    dest_dir: &Path,
) -> MixpodResult<BaseArchive> {
    let dest = dest_dir.join(ARCHIVE_FILE);

    if dest.is_file() {
        if let Some(digest) = verify_existing(upstream, version, &dest).await {
            debug!("Reusing base archive {}", dest.display());
            return Ok(BaseArchive {
                path: dest,
                digest,
                reused: true,
            });
        }
    }

    info!("Downloading image base for version {}", version);
    upstream
        .fetch_to_file(&archive_remote_path(version), &dest)
        .await
        .map_err(|e| MixpodError::ArchiveFetch {
            version: version.to_string(),
            dest: dest.clone(),
            source: Box::new(e),
        })?;

    let digest = file_digest(&dest).await?;
    Ok(BaseArchive {
        path: dest,
        digest,
        reused: false,
    })
}

/// Digest of the existing archive if it matches upstream's checksum
async fn verify_existing(
    upstream: &dyn UpstreamSource,
    version: &str,
    archive: &Path,
) -> Option<String> {
    let published = match upstream.fetch_text(&checksum_remote_path(version)).await {
        Ok(line) => parse_checksum_line(&line)?,
        Err(e) => {
            warn!("Could not fetch checksum for version {}: {}", version, e);
            return None;
        }
    };

    let local = match file_digest(archive).await {
        Ok(digest) => digest,
        Err(e) => {
            warn!("Could not hash {}: {}", archive.display(), e);
            return None;
        }
    };

    if local.eq_ignore_ascii_case(&published) {
        Some(local)
    } else {
        info!("Base archive checksum mismatch, downloading again");
        None
    }
}

/// The digest is the first whitespace-separated token of a checksum line
fn parse_checksum_line(line: &str) -> Option<String> {
    line.split_whitespace().next().map(str::to_string)
}

/// Hex SHA-512 of a file's full contents
pub async fn file_digest(path: &Path) -> MixpodResult<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        hash_file(&path).map_err(|e| MixpodError::io(format!("hashing {}", path.display()), e))
    })
    .await
    .map_err(|e| MixpodError::Internal(format!("hash task failed: {e}")))?
}

fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha512::new();
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}
