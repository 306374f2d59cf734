//! Subprocess execution
//!
//! Every runtime invocation goes through [`ProcessRunner`] so argument lists
//! can be checked without a container engine installed.

use crate::error::{MixpodError, MixpodResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished process
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Exit code, `None` if killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external programs
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion, capturing stdout and stderr
    async fn output(&self, program: &str, args: &[String]) -> MixpodResult<ProcessOutput>;

    /// Run with inherited stdio and return the exit code (-1 if signaled)
    async fn status(&self, program: &str, args: &[String]) -> MixpodResult<i32>;
}

/// Runs programs on the host with `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcess;

impl SystemProcess {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for SystemProcess {
    async fn output(&self, program: &str, args: &[String]) -> MixpodResult<ProcessOutput> {
        debug!("Executing: {} {:?}", program, args);

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| spawn_error(program, args, e))?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn status(&self, program: &str, args: &[String]) -> MixpodResult<i32> {
        debug!("Executing interactively: {} {:?}", program, args);

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| spawn_error(program, args, e))?;

        Ok(status.code().unwrap_or(-1))
    }
}

/// Render a program and its arguments for error messages
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

fn spawn_error(program: &str, args: &[String], err: std::io::Error) -> MixpodError {
    if err.kind() == ErrorKind::NotFound {
        MixpodError::RuntimeNotFound {
            program: program.to_string(),
        }
    } else {
        MixpodError::command_failed(display_command(program, args), err)
    }
}
