//! Orchestration of the container runtime
//!
//! - `process`: host subprocess execution
//! - `runtime`: docker-compatible runtime commands
//! - `container`: arguments for a single container run

pub mod container;
pub mod process;
pub mod runtime;

pub use container::ContainerSpec;
pub use process::{ProcessOutput, ProcessRunner, SystemProcess};
pub use runtime::{CliRuntime, ContainerRuntime};

/// Max number of output lines to include in build error messages.
const BUILD_ERROR_TAIL_LINES: usize = 50;

/// Extract the useful tail of build output for error diagnostics.
///
/// Combines stdout and stderr, then returns the last `BUILD_ERROR_TAIL_LINES`
/// lines so error messages are actionable without being overwhelming.
pub(crate) fn build_error_output(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let start = lines.len().saturating_sub(BUILD_ERROR_TAIL_LINES);
    lines[start..].join("\n")
}
