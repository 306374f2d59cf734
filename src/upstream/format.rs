//! Upstream version and format lookup
//!
//! A format is the compatibility generation of upstream content. Each format
//! spans a contiguous range of releases, published as
//! `/update/version/format<F>/first` and `.../latest`.

use crate::config::schema::LATEST_VERSION;
use crate::error::{MixpodError, MixpodResult};
use crate::upstream::UpstreamSource;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Release range sharing one format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRange {
    pub format: String,
    /// First release built with this format
    pub first: u32,
    /// Latest release built with this format
    pub latest: u32,
}

/// Turn the configured upstream version into a concrete release.
///
/// `"latest"` is looked up on the server; anything else is used as given.
pub async fn resolve_upstream_version(
    upstream: &dyn UpstreamSource,
    configured: &str,
) -> MixpodResult<String> {
    let configured = configured.trim();
    if configured.is_empty() {
        return Err(MixpodError::UpstreamVersionUnset);
    }

    let version = if configured == LATEST_VERSION {
        let latest = upstream.fetch_text("/latest").await?;
        debug!("Upstream latest is {}", latest);
        latest
    } else {
        configured.to_string()
    };

    validate_token("upstream version", &version)?;
    Ok(version)
}

/// Fetch the format of an upstream release
pub async fn upstream_format(upstream: &dyn UpstreamSource, version: &str) -> MixpodResult<String> {
    let format = upstream
        .fetch_text(&format!("/update/{version}/format"))
        .await?;
    validate_token("format", &format)?;
    Ok(format)
}

/// Find the format of `version` and the release range sharing it
pub async fn resolve_format_range(
    upstream: &dyn UpstreamSource,
    version: &str,
) -> MixpodResult<FormatRange> {
    let lookup = async {
        let format = upstream_format(upstream, version).await?;
        let first = fetch_release(upstream, &format, "first").await?;
        let latest = fetch_release(upstream, &format, "latest").await?;
        Ok::<_, MixpodError>(FormatRange {
            format,
            first,
            latest,
        })
    };

    lookup.await.map_err(|e| MixpodError::FormatResolve {
        version: version.to_string(),
        source: Box::new(e),
    })
}

async fn fetch_release(
    upstream: &dyn UpstreamSource,
    format: &str,
    which: &str,
) -> MixpodResult<u32> {
    let text = upstream
        .fetch_text(&format!("/update/version/format{format}/{which}"))
        .await?;
    text.parse().map_err(|_| MixpodError::UpstreamInvalid {
        what: format!("{which} release of format {format}"),
        value: text,
    })
}

/// Read the host's own format, `None` if the host does not publish one
pub async fn read_host_format(path: &Path) -> MixpodResult<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content.trim().to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(MixpodError::io(
            format!("reading host format from {}", path.display()),
            e,
        )),
    }
}

/// Formats and versions end up in URLs and image tags, so they must be a
/// single tag-safe token
fn validate_token(what: &str, value: &str) -> MixpodResult<()> {
    let valid = !value.starts_with(['.', '-'])
        && !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(MixpodError::UpstreamInvalid {
            what: what.to_string(),
            value: value.to_string(),
        })
    }
}
