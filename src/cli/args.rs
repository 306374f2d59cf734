//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Mixpod - run mix builds in a container matching upstream
///
/// Builds (and caches) an image per upstream format, mounts the paths the
/// mix configuration references and runs the command inside it.
#[derive(Parser, Debug)]
#[command(name = "mixpod")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "MIXPOD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command in the container for the configured upstream
    Run(RunArgs),

    /// Build the image for the configured upstream without running anything
    Build,

    /// Show the host paths that would be mounted
    Mounts(MountsArgs),

    /// Compare host and upstream formats and check the runtime
    Status,

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Run on the host without a container
    #[arg(long)]
    pub native: bool,

    /// Run on the host when its format matches upstream, else in a container
    #[arg(long, conflicts_with = "native")]
    pub auto: bool,

    /// Command and arguments to run
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

/// Arguments for the mounts command
#[derive(Parser, Debug)]
pub struct MountsArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One entry per line
    Text,
    /// JSON output
    Json,
}
