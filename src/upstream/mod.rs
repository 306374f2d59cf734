//! Upstream content server access
//!
//! Everything mixpod needs from upstream is a file under one base URL:
//! format markers, version pointers, base archives and their checksums.

pub mod format;

pub use format::{
    read_host_format, resolve_format_range, resolve_upstream_version, upstream_format, FormatRange,
};

use crate::error::{MixpodError, MixpodResult};
use async_trait::async_trait;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Source of upstream files, addressed by path relative to the base URL
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Fetch a small text file, with surrounding whitespace trimmed
    async fn fetch_text(&self, remote_path: &str) -> MixpodResult<String>;

    /// Download a file to `dest`, replacing whatever is there
    async fn fetch_to_file(&self, remote_path: &str, dest: &Path) -> MixpodResult<()>;
}

/// Upstream server reached over HTTP(S)
#[derive(Clone)]
pub struct HttpUpstream {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpUpstream {
    /// Create a client for the server at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            agent: ureq::Agent::new_with_defaults(),
        }
    }

    /// Full URL for a path relative to the base URL
    pub fn url(&self, remote_path: &str) -> String {
        join_url(&self.base_url, remote_path)
    }
}

#[async_trait]
impl UpstreamSource for HttpUpstream {
    async fn fetch_text(&self, remote_path: &str) -> MixpodResult<String> {
        let url = self.url(remote_path);
        let agent = self.agent.clone();
        debug!("Fetching {}", url);

        tokio::task::spawn_blocking(move || {
            let mut response = agent.get(&url).call().map_err(|e| fetch_error(&url, e))?;
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| fetch_error(&url, e))?;
            Ok(body.trim().to_string())
        })
        .await
        .map_err(|e| MixpodError::Internal(format!("fetch task failed: {e}")))?
    }

    async fn fetch_to_file(&self, remote_path: &str, dest: &Path) -> MixpodResult<()> {
        let url = self.url(remote_path);
        let agent = self.agent.clone();
        let dest = dest.to_path_buf();
        info!("Downloading {}", url);

        tokio::task::spawn_blocking(move || {
            let response = agent.get(&url).call().map_err(|e| fetch_error(&url, e))?;
            let mut reader = response.into_body().into_reader();
            write_via_partial(&mut reader, &dest, &url)
        })
        .await
        .map_err(|e| MixpodError::Internal(format!("download task failed: {e}")))?
    }
}

/// Stream `reader` into a sibling `.part` file and rename it over `dest`.
///
/// An interrupted download never looks like a complete file: on failure the
/// partial file is removed and `dest` is left as it was.
fn write_via_partial(reader: &mut impl Read, dest: &Path, url: &str) -> MixpodResult<()> {
    let partial = partial_path(dest);
    let mut file = File::create(&partial)
        .map_err(|e| MixpodError::io(format!("creating {}", partial.display()), e))?;

    let written = io::copy(reader, &mut file)
        .map_err(|e| MixpodError::UpstreamFetch {
            url: url.to_string(),
            reason: e.to_string(),
        })
        .and_then(|_| {
            file.sync_all()
                .map_err(|e| MixpodError::io(format!("flushing {}", partial.display()), e))
        });
    drop(file);

    if let Err(e) = written {
        if let Err(remove) = std::fs::remove_file(&partial) {
            debug!("Could not remove {}: {}", partial.display(), remove);
        }
        return Err(e);
    }

    std::fs::rename(&partial, dest)
        .map_err(|e| MixpodError::io(format!("moving download to {}", dest.display()), e))
}

fn fetch_error(url: &str, err: ureq::Error) -> MixpodError {
    MixpodError::UpstreamFetch {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

fn join_url(base: &str, remote_path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        remote_path.trim_start_matches('/')
    )
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}
