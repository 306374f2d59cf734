//! Container run specification

use crate::mounts::MountSet;

/// Everything needed to start one throwaway container
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    /// Image to run
    pub image: String,
    /// Working directory inside the container
    pub workdir: String,
    /// Program replacing the image entrypoint
    pub entrypoint: String,
    /// Arguments passed to the entrypoint
    pub args: Vec<String>,
    /// Host directories mounted at the same path inside the container
    pub mounts: MountSet,
    /// Network mode
    pub network: String,
    /// Keep stdin open
    pub interactive: bool,
    /// Remove the container when it exits
    pub remove_on_exit: bool,
}

impl ContainerSpec {
    /// Spec for running `command` in `image` with the host network, removed on
    /// exit. Returns `None` for an empty command.
    pub fn for_command(
        image: impl Into<String>,
        workdir: impl Into<String>,
        command: &[String],
        mounts: MountSet,
    ) -> Option<Self> {
        let (entrypoint, args) = command.split_first()?;
        Some(Self {
            image: image.into(),
            workdir: workdir.into(),
            entrypoint: entrypoint.clone(),
            args: args.to_vec(),
            mounts,
            network: "host".to_string(),
            interactive: true,
            remove_on_exit: true,
        })
    }

    /// Arguments for the runtime's `run` subcommand
    pub fn run_args(&self) -> Vec<String> {
        let mut args = vec!["run".to_string()];

        if self.interactive {
            args.push("-i".to_string());
        }
        args.push(format!("--network={}", self.network));
        if self.remove_on_exit {
            args.push("--rm".to_string());
        }

        args.push("--workdir".to_string());
        args.push(self.workdir.clone());
        args.push("--entrypoint".to_string());
        args.push(self.entrypoint.clone());

        for path in &self.mounts {
            args.push("-v".to_string());
            args.push(format!("{path}:{path}"));
        }

        args.push(self.image.clone());
        args.extend(self.args.iter().cloned());
        args
    }
}
