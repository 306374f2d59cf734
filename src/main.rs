//! Mixpod - run mix builds in a container matching upstream
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use mixpod::cli::{Cli, Commands};
use mixpod::config::ConfigManager;
use mixpod::error::{MixpodError, MixpodResult};
use std::error::Error as _;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("{} {}", style("Caused by:").dim(), cause);
                source = cause.source();
            }
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> MixpodResult<()> {
    let cli = Cli::parse();

    // 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("mixpod=warn"),
        1 => EnvFilter::new("mixpod=info"),
        _ => EnvFilter::new("mixpod=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let cwd =
        std::env::current_dir().map_err(|e| MixpodError::io("getting current directory", e))?;

    let manager = ConfigManager::discover(cli.config.clone(), &cwd);
    debug!("Using config {}", manager.path().display());
    let config = manager.load().await?;

    match cli.command {
        Commands::Run(args) => mixpod::cli::commands::run(args, &config, &cwd).await,
        Commands::Build => mixpod::cli::commands::build(&config, &cwd).await,
        Commands::Mounts(args) => mixpod::cli::commands::mounts(args, &config, &cwd).await,
        Commands::Status => mixpod::cli::commands::status(&config).await,
        Commands::Config(args) => mixpod::cli::commands::config(args, &config, &manager).await,
    }
}
