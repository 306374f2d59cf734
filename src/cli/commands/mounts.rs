//! Mounts command - show the host paths a run would mount

use crate::cli::args::{MountsArgs, OutputFormat};
use crate::config::Config;
use crate::error::MixpodResult;
use crate::mounts::{config_mounts, MountSet};
use std::path::Path;

/// Execute the mounts command
pub async fn execute(args: MountsArgs, config: &Config, cwd: &Path) -> MixpodResult<()> {
    let mounts = config_mounts(config, cwd);
    println!("{}", render(&mounts, args.format)?);
    Ok(())
}

fn render(mounts: &MountSet, format: OutputFormat) -> MixpodResult<String> {
    match format {
        OutputFormat::Text => Ok(mounts.paths().join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(mounts)?),
    }
}
