//! Run command - execute a command in the upstream-matched container

use crate::cli::args::RunArgs;
use crate::config::Config;
use crate::error::{MixpodError, MixpodResult};
use crate::orchestration::process::display_command;
use crate::orchestration::{CliRuntime, ProcessRunner, SystemProcess};
use crate::runner::{container_required, ContainerRunner};
use crate::ui::{TaskSpinner, UiContext};
use crate::upstream::{read_host_format, resolve_upstream_version, upstream_format};
use crate::upstream::{HttpUpstream, UpstreamSource};
use std::path::Path;
use tracing::{debug, info};

/// Execute the run command
pub async fn execute(args: RunArgs, config: &Config, cwd: &Path) -> MixpodResult<()> {
    let upstream = HttpUpstream::new(config.upstream.url.clone());

    let native = args.native || (args.auto && runs_natively(config, &upstream).await?);
    if native {
        return run_native(&SystemProcess::new(), &args.command).await;
    }

    let ctx = UiContext::detect();
    let runtime = CliRuntime::from_settings(&config.container);
    let mut runner = ContainerRunner::new(config, cwd, &runtime, &upstream);

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Preparing container...");
    let prepared = match runner.prepare().await {
        Ok(prepared) => prepared,
        Err(e) => {
            spinner.stop_error("Could not prepare container");
            return Err(e);
        }
    };
    // The container owns the terminal from here on
    spinner.clear();

    runner.execute(&prepared, &args.command).await
}

/// Whether the host itself can build for the configured upstream
pub async fn runs_natively(config: &Config, upstream: &dyn UpstreamSource) -> MixpodResult<bool> {
    let host = read_host_format(&config.container.host_format_path).await?;
    let Some(host) = host else {
        info!("Host format unknown, using a container");
        return Ok(false);
    };

    let version = resolve_upstream_version(upstream, &config.upstream.version).await?;
    let format = upstream_format(upstream, &version).await?;
    debug!("Host format {}, upstream {} is format {}", host, version, format);

    Ok(!container_required(Some(&host), &format))
}

/// Run `command` directly on the host with inherited stdio
pub async fn run_native(process: &dyn ProcessRunner, command: &[String]) -> MixpodResult<()> {
    let (program, args) = command.split_first().ok_or(MixpodError::EmptyCommand)?;
    info!("Running command natively: {:?}", command);

    let code = process.status(program, args).await.map_err(|e| match e {
        MixpodError::RuntimeNotFound { program } => {
            MixpodError::command_exec(program, "command not found")
        }
        other => other,
    })?;

    if code != 0 {
        return Err(MixpodError::NativeRun {
            command: display_command(program, args),
            code,
        });
    }
    Ok(())
}
