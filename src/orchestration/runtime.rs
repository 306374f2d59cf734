//! Container runtime abstraction
//!
//! Provides a trait for the container operations mixpod needs, implemented
//! for any docker-compatible command line (docker, podman).

use crate::config::schema::ContainerSettings;
use crate::error::{MixpodError, MixpodResult};
use crate::orchestration::container::ContainerSpec;
use crate::orchestration::process::{display_command, ProcessRunner, SystemProcess};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Abstract container runtime interface
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Check if the runtime binary can be executed
    async fn is_available(&self) -> MixpodResult<bool>;

    /// Check if an image with this exact name exists locally
    async fn image_exists(&self, image: &str) -> MixpodResult<bool>;

    /// Build `context_dir` into an image tagged `tag`
    async fn build_image(&self, context_dir: &Path, tag: &str) -> MixpodResult<()>;

    /// Run a container attached to the terminal and return its exit code
    async fn run(&self, spec: &ContainerSpec) -> MixpodResult<i32>;

    /// Get the human-readable runtime name for display
    fn runtime_name(&self) -> &str;
}

/// Runtime driven through a docker-compatible CLI
pub struct CliRuntime {
    program: String,
    process: Arc<dyn ProcessRunner>,
}

impl CliRuntime {
    /// Create a runtime invoking `program` through `process`
    pub fn new(program: impl Into<String>, process: Arc<dyn ProcessRunner>) -> Self {
        Self {
            program: program.into(),
            process,
        }
    }

    /// Runtime configured in `[container]`, executing on the host
    pub fn from_settings(settings: &ContainerSettings) -> Self {
        Self::new(settings.runtime.clone(), Arc::new(SystemProcess::new()))
    }

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }
}

#[async_trait]
impl ContainerRuntime for CliRuntime {
    async fn is_available(&self) -> MixpodResult<bool> {
        match self.process.output(&self.program, &Self::args(&["--version"])).await {
            Ok(output) => Ok(output.success()),
            Err(MixpodError::RuntimeNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn image_exists(&self, image: &str) -> MixpodResult<bool> {
        let args = Self::args(&["images", "-q", image]);
        let output = self.process.output(&self.program, &args).await?;

        if !output.success() {
            return Err(MixpodError::command_exec(
                display_command(&self.program, &args),
                output.stderr.trim(),
            ));
        }

        Ok(!output.stdout.trim().is_empty())
    }

    async fn build_image(&self, context_dir: &Path, tag: &str) -> MixpodResult<()> {
        let context = context_dir.display().to_string();
        let args = Self::args(&["build", "-t", tag, "--rm", &context]);
        debug!("Building: {}", display_command(&self.program, &args));

        let output = self.process.output(&self.program, &args).await?;

        if !output.success() {
            return Err(MixpodError::ImageBuild {
                image: tag.to_string(),
                reason: super::build_error_output(&output.stdout, &output.stderr),
            });
        }

        Ok(())
    }

    async fn run(&self, spec: &ContainerSpec) -> MixpodResult<i32> {
        let args = spec.run_args();
        debug!("Running container: {}", display_command(&self.program, &args));

        self.process.status(&self.program, &args).await
    }

    fn runtime_name(&self) -> &str {
        &self.program
    }
}
