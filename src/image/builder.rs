//! Image building
//!
//! One image per upstream format, built from scratch out of the base
//! archive. The image name alone is the cache key: once the runtime reports
//! an image by that name, nothing is fetched or rebuilt.

use crate::error::{MixpodError, MixpodResult};
use crate::image::archive::ensure_base_archive;
use crate::orchestration::ContainerRuntime;
use crate::upstream::UpstreamSource;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of ensuring an image exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredImage {
    /// Full image name (e.g., "mixer-tools/mixer:30")
    pub name: String,

    /// Whether the image was already present (no build needed)
    pub was_cached: bool,
}

/// Image name for a format
pub fn image_name(repository: &str, format: &str) -> String {
    format!("{repository}:{format}")
}

/// Build recipe for an image seeded from `archive_file`
pub fn dockerfile_contents(archive_file: &str) -> String {
    format!(
        "FROM scratch\n\
         ADD {archive_file} /\n\
         RUN clrtrust generate\n\
         CMD [\"/bin/bash\"]\n"
    )
}

/// Builds per-format images on demand
pub struct ImageBuilder<'a> {
    runtime: &'a dyn ContainerRuntime,
    upstream: &'a dyn UpstreamSource,
    repository: String,
    work_root: PathBuf,
}

impl<'a> ImageBuilder<'a> {
    /// Create a builder keeping build directories under `work_root`
    pub fn new(
        runtime: &'a dyn ContainerRuntime,
        upstream: &'a dyn UpstreamSource,
        repository: impl Into<String>,
        work_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runtime,
            upstream,
            repository: repository.into(),
            work_root: work_root.into(),
        }
    }

    /// Image name used for `format`
    pub fn image_name(&self, format: &str) -> String {
        image_name(&self.repository, format)
    }

    /// Build directory used for `format`
    pub fn build_dir(&self, format: &str) -> PathBuf {
        self.work_root.join(format!("mixer-{format}"))
    }

    /// Make sure the image for `format` exists, building it from the base
    /// archive of upstream release `version` if not.
    ///
    /// The build directory is kept after a build, successful or not.
    pub async fn ensure_image(&self, format: &str, version: &str) -> MixpodResult<EnsuredImage> {
        let name = self.image_name(format);

        let exists = self
            .runtime
            .image_exists(&name)
            .await
            .map_err(|e| MixpodError::ImageQuery {
                image: name.clone(),
                source: Box::new(e),
            })?;
        if exists {
            debug!("Image already present: {}", name);
            return Ok(EnsuredImage {
                name,
                was_cached: true,
            });
        }

        let build_dir = self.build_dir(format);
        tokio::fs::create_dir_all(&build_dir).await.map_err(|e| {
            MixpodError::io(
                format!("creating build directory {}", build_dir.display()),
                e,
            )
        })?;

        let archive = ensure_base_archive(self.upstream, version, &build_dir)
            .await
            .map_err(|e| MixpodError::ImageFetch {
                image: name.clone(),
                source: Box::new(e),
            })?;

        write_dockerfile(&build_dir, &dockerfile_contents(archive.file_name())).await?;

        info!("Building image {} from {}", name, build_dir.display());
        self.runtime.build_image(&build_dir, &name).await?;

        Ok(EnsuredImage {
            name,
            was_cached: false,
        })
    }
}

/// Write the Dockerfile unless an identical one is already there
async fn write_dockerfile(dir: &Path, contents: &str) -> MixpodResult<()> {
    let path = dir.join("Dockerfile");

    if let Ok(existing) = tokio::fs::read_to_string(&path).await {
        if existing == contents {
            return Ok(());
        }
    }

    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| MixpodError::io(format!("writing {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::archive::{archive_remote_path, ARCHIVE_FILE};
    use crate::orchestration::CliRuntime;
    use crate::testutil::{FakeProcess, FakeUpstream};
    use std::sync::Arc;
    use tempfile::TempDir;

    const REPO: &str = "mixer-tools/mixer";

    fn upstream_with_archive() -> FakeUpstream {
        FakeUpstream::new().with_file(&archive_remote_path("29990"), b"rootfs")
    }

    #[test]
    fn dockerfile_references_archive() {
        assert_eq!(
            dockerfile_contents(ARCHIVE_FILE),
            "FROM scratch\nADD mixer.tar.xz /\nRUN clrtrust generate\nCMD [\"/bin/bash\"]\n"
        );
    }

    #[test]
    fn names_depend_only_on_format() {
        assert_eq!(image_name(REPO, "30"), "mixer-tools/mixer:30");

        let process = Arc::new(FakeProcess::new());
        let runtime = CliRuntime::new("docker", process);
        let upstream = FakeUpstream::new();
        let builder = ImageBuilder::new(&runtime, &upstream, REPO, "/mix/docker");
        assert_eq!(builder.build_dir("30"), PathBuf::from("/mix/docker/mixer-30"));
    }

    #[tokio::test]
    async fn existing_image_short_circuits() {
        let work = TempDir::new().unwrap();
        let process = Arc::new(FakeProcess::new().with_images_output("9b1f3c2e7a44\n"));
        let runtime = CliRuntime::new("docker", process.clone());
        let upstream = upstream_with_archive();

        let image = ImageBuilder::new(&runtime, &upstream, REPO, work.path())
            .ensure_image("30", "29990")
            .await
            .unwrap();

        assert!(image.was_cached);
        assert!(process.calls_to("build").is_empty());
        assert!(upstream.file_calls().is_empty());
        assert!(!work.path().join("mixer-30").exists());
    }

    #[tokio::test]
    async fn missing_image_is_built_from_archive() {
        let work = TempDir::new().unwrap();
        let process = Arc::new(FakeProcess::new());
        let runtime = CliRuntime::new("docker", process.clone());
        let upstream = upstream_with_archive();

        let image = ImageBuilder::new(&runtime, &upstream, REPO, work.path())
            .ensure_image("30", "29990")
            .await
            .unwrap();

        let build_dir = work.path().join("mixer-30");
        assert_eq!(image.name, "mixer-tools/mixer:30");
        assert!(!image.was_cached);
        assert_eq!(std::fs::read(build_dir.join(ARCHIVE_FILE)).unwrap(), b"rootfs");
        assert_eq!(
            std::fs::read_to_string(build_dir.join("Dockerfile")).unwrap(),
            dockerfile_contents(ARCHIVE_FILE)
        );

        let builds = process.calls_to("build");
        assert_eq!(builds.len(), 1);
        assert_eq!(
            builds[0],
            vec![
                "docker".to_string(),
                "build".to_string(),
                "-t".to_string(),
                "mixer-tools/mixer:30".to_string(),
                "--rm".to_string(),
                build_dir.display().to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn stale_dockerfile_is_rewritten() {
        let work = TempDir::new().unwrap();
        let build_dir = work.path().join("mixer-30");
        std::fs::create_dir_all(&build_dir).unwrap();
        std::fs::write(build_dir.join("Dockerfile"), "FROM busybox\n").unwrap();

        let process = Arc::new(FakeProcess::new());
        let runtime = CliRuntime::new("docker", process);
        let upstream = upstream_with_archive();

        ImageBuilder::new(&runtime, &upstream, REPO, work.path())
            .ensure_image("30", "29990")
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(build_dir.join("Dockerfile")).unwrap(),
            dockerfile_contents(ARCHIVE_FILE)
        );
    }

    #[tokio::test]
    async fn fetch_failure_stops_before_build_and_keeps_directory() {
        let work = TempDir::new().unwrap();
        let process = Arc::new(FakeProcess::new());
        let runtime = CliRuntime::new("docker", process.clone());
        let upstream = FakeUpstream::new();

        let err = ImageBuilder::new(&runtime, &upstream, REPO, work.path())
            .ensure_image("30", "29990")
            .await
            .unwrap_err();

        assert!(matches!(err, MixpodError::ImageFetch { ref image, .. } if image == "mixer-tools/mixer:30"));
        assert!(process.calls_to("build").is_empty());
        assert!(work.path().join("mixer-30").is_dir());
    }

    #[tokio::test]
    async fn build_failure_is_reported() {
        let work = TempDir::new().unwrap();
        let process = Arc::new(FakeProcess::new().with_build_failure("no space left on device"));
        let runtime = CliRuntime::new("docker", process);
        let upstream = upstream_with_archive();

        let err = ImageBuilder::new(&runtime, &upstream, REPO, work.path())
            .ensure_image("30", "29990")
            .await
            .unwrap_err();

        assert!(matches!(err, MixpodError::ImageBuild { .. }));
        assert!(err.to_string().contains("no space left"));
    }

    #[tokio::test]
    async fn image_query_failure_is_wrapped() {
        let work = TempDir::new().unwrap();
        let process = Arc::new(FakeProcess::new().without_binary());
        let runtime = CliRuntime::new("docker", process);
        let upstream = FakeUpstream::new();

        let err = ImageBuilder::new(&runtime, &upstream, REPO, work.path())
            .ensure_image("30", "29990")
            .await
            .unwrap_err();

        assert!(matches!(err, MixpodError::ImageQuery { .. }));
    }
}
