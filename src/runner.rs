//! Running a command inside the upstream-matched container
//!
//! A run moves through fixed stages, each blocking until done:
//!
//! `Start → FormatResolved → ImageEnsured → MountsComputed → Running`
//!
//! and ends in `Succeeded` or `Failed`. The first error ends the run.

use crate::config::Config;
use crate::error::{MixpodError, MixpodResult};
use crate::image::{EnsuredImage, ImageBuilder};
use crate::mounts::{config_mounts, MountSet};
use crate::orchestration::{ContainerRuntime, ContainerSpec};
use crate::upstream::{resolve_format_range, resolve_upstream_version, FormatRange, UpstreamSource};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Progress of a container run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Start,
    FormatResolved,
    ImageEnsured,
    MountsComputed,
    Running,
    Succeeded,
    Failed,
}

/// Everything resolved before the container starts
#[derive(Debug, Clone)]
pub struct PreparedRun {
    /// Upstream release the config points at
    pub version: String,
    /// Format of that release and its release range
    pub range: FormatRange,
    /// Image for the format
    pub image: EnsuredImage,
    /// Host directories to mount
    pub mounts: MountSet,
}

/// Whether a command has to run in a container rather than on the host.
///
/// Content built by a host of another format (or of unknown format) would
/// not match upstream.
pub fn container_required(host_format: Option<&str>, upstream_format: &str) -> bool {
    host_format != Some(upstream_format)
}

/// Runs commands in a container matching the configured upstream
pub struct ContainerRunner<'a> {
    config: &'a Config,
    cwd: PathBuf,
    runtime: &'a dyn ContainerRuntime,
    upstream: &'a dyn UpstreamSource,
    stage: RunStage,
}

impl<'a> ContainerRunner<'a> {
    /// Create a runner for `config`, treating `cwd` as the working directory
    pub fn new(
        config: &'a Config,
        cwd: impl Into<PathBuf>,
        runtime: &'a dyn ContainerRuntime,
        upstream: &'a dyn UpstreamSource,
    ) -> Self {
        Self {
            config,
            cwd: cwd.into(),
            runtime,
            upstream,
            stage: RunStage::Start,
        }
    }

    /// Current stage
    pub fn stage(&self) -> RunStage {
        self.stage
    }

    /// Working directory used for the run
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Root of the per-format build directories
    pub fn work_root(&self) -> PathBuf {
        self.config
            .container
            .work_root
            .clone()
            .unwrap_or_else(|| self.cwd.join("docker"))
    }

    /// Resolve the format and make sure its image exists
    pub async fn ensure_image(&mut self) -> MixpodResult<(String, FormatRange, EnsuredImage)> {
        let (version, range) = self.resolve_format().await?;

        let builder = ImageBuilder::new(
            self.runtime,
            self.upstream,
            self.config.container.image_repository.clone(),
            self.work_root(),
        );
        let result = builder
            .ensure_image(&range.format, &range.first.to_string())
            .await;
        let image = self.track(result)?;
        info!(
            "Using image {}{}",
            image.name,
            if image.was_cached { " (cached)" } else { "" }
        );
        self.advance(RunStage::ImageEnsured);

        Ok((version, range, image))
    }

    /// Everything up to, but not including, starting the container
    pub async fn prepare(&mut self) -> MixpodResult<PreparedRun> {
        let (version, range, image) = self.ensure_image().await?;

        let mounts = config_mounts(self.config, &self.cwd);
        debug!("Mounts: {:?}", mounts.paths());
        self.advance(RunStage::MountsComputed);

        Ok(PreparedRun {
            version,
            range,
            image,
            mounts,
        })
    }

    /// Start the container for `command` and wait for it to exit.
    ///
    /// Output is not captured. A non-zero exit is an error carrying the code.
    pub async fn execute(&mut self, prepared: &PreparedRun, command: &[String]) -> MixpodResult<()> {
        let spec = ContainerSpec::for_command(
            prepared.image.name.clone(),
            self.cwd.to_string_lossy(),
            command,
            prepared.mounts.clone(),
        );
        let spec = self.track(spec.ok_or(MixpodError::EmptyCommand))?;

        info!("Running command in container: {:?}", command);
        self.advance(RunStage::Running);

        let result = self.runtime.run(&spec).await;
        let code = self.track(result)?;
        if code != 0 {
            self.advance(RunStage::Failed);
            return Err(MixpodError::ContainerRun {
                command: command.join(" "),
                code,
            });
        }

        self.advance(RunStage::Succeeded);
        Ok(())
    }

    /// Run `command` (program first) in the container for the configured
    /// upstream version
    pub async fn run_in_container(&mut self, command: &[String]) -> MixpodResult<()> {
        if command.is_empty() {
            self.advance(RunStage::Failed);
            return Err(MixpodError::EmptyCommand);
        }

        let prepared = self.prepare().await?;
        self.execute(&prepared, command).await
    }

    async fn resolve_format(&mut self) -> MixpodResult<(String, FormatRange)> {
        let result = async {
            let version =
                resolve_upstream_version(self.upstream, &self.config.upstream.version).await?;
            let range = resolve_format_range(self.upstream, &version).await?;
            Ok::<_, MixpodError>((version, range))
        }
        .await;

        let (version, range) = self.track(result)?;
        info!(
            "Upstream version {} is format {} (releases {}..={})",
            version, range.format, range.first, range.latest
        );
        self.advance(RunStage::FormatResolved);
        Ok((version, range))
    }

    fn advance(&mut self, next: RunStage) {
        debug!("Run stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    fn track<T>(&mut self, result: MixpodResult<T>) -> MixpodResult<T> {
        if result.is_err() {
            self.advance(RunStage::Failed);
        }
        result
    }
}
