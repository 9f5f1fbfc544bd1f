//! live-probe - Report installed Ableton Live copies and their licences
//!
//! Finds Live bundles on the host, reads version, variant and architecture,
//! and decodes the Unlock.cfg licence store for each installed version.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use live_probe::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli::load_config(&cli)?;

    // Initialize logging
    let level = if cli.verbose {
        "debug"
    } else {
        config.general.log_level.as_str()
    };
    let json_logs = config.general.json_logs;
    tracing_subscriber::registry()
        .with((!json_logs).then(|| {
            fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr)
        }))
        .with(json_logs.then(|| fmt::layer().json().with_target(false).with_writer(std::io::stderr)))
        .with(EnvFilter::from_default_env().add_directive(format!("live_probe={}", level).parse()?))
        .init();

    match cli.command {
        Some(Commands::Scan(ref args)) => {
            if !cli::run_scan(args, &config, cli.output).await? {
                std::process::exit(1);
            }
        }
        Some(Commands::Licences(ref args)) => {
            cli::run_licences(args, &config, cli.output).await?;
        }
        Some(Commands::Decode(ref args)) => {
            cli::run_decode(args, cli.output).await?;
        }
        Some(Commands::Config(ref args)) => {
            cli::run_config(args, &config)?;
        }
        None => {
            // Default: scan the configured search dirs
            if !cli::run_scan(&cli::ScanArgs::default(), &config, cli.output).await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
