//! CLI module - Command line interface definitions and handlers

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{self, Config};
use crate::discovery::{self, Version};
use crate::licence;
use crate::report::{self, LicenceReport, ScanReport};

/// live-probe - Report installed Ableton Live copies and their licences
///
/// Finds Live bundles, reads version, variant and architecture, and decodes
/// the Unlock.cfg licence store. All operations are read-only.
#[derive(Parser, Debug)]
#[command(name = "live-probe")]
#[command(version)]
#[command(about = "Report installed Ableton Live copies and their licences", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Use this config file instead of the default location
    #[arg(long = "config", global = true, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find installations and report version, variant, arch and licence (default)
    Scan(ScanArgs),

    /// Decode the licence store of one installed version
    Licences(LicencesArgs),

    /// Decode an arbitrary Unlock.cfg file
    Decode(DecodeArgs),

    /// Show or create the config file
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Parser, Default)]
pub struct ScanArgs {
    /// Directories to search (default: from config)
    pub dirs: Vec<PathBuf>,

    /// Licence store root (default: ~/Library/Application Support/Ableton)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Skip host OS version checks
    #[arg(long)]
    pub no_os_check: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct LicencesArgs {
    /// Installed version, e.g. 11.3.25
    #[arg(required = true, value_name = "VERSION")]
    pub live_version: String,

    /// Variant to match a product licence against (Suite, Standard, Intro, Lite)
    #[arg(long)]
    pub variant: Option<String>,

    /// Licence store root
    #[arg(long)]
    pub store: Option<PathBuf>,
}

#[derive(Debug, Clone, Parser)]
pub struct DecodeArgs {
    /// Path to an Unlock.cfg file
    #[arg(required = true)]
    pub file: PathBuf,

    /// Variant to match a product licence against
    #[arg(long)]
    pub variant: Option<String>,
}

#[derive(Debug, Clone, Parser)]
pub struct ConfigArgs {
    /// Write a default config file if none exists
    #[arg(long)]
    pub init: bool,

    /// Print a commented sample config
    #[arg(long)]
    pub sample: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable (default)
    #[default]
    Human,
    /// JSON output
    Json,
}

/// Load the config named on the command line, or the default one
pub fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config_file {
        Some(path) => Config::load_from(path),
        None => Ok(Config::load()),
    }
}

/// Discover installations. Returns whether every installation is healthy.
pub async fn run_scan(args: &ScanArgs, config: &Config, output: OutputFormat) -> Result<bool> {
    let mut options = config.discovery_options();
    if !args.dirs.is_empty() {
        options.search_dirs = args.dirs.clone();
    }
    if let Some(store) = &args.store {
        options.store_root = store.clone();
    }
    if !args.no_os_check {
        options.host_version = discovery::host_os_version();
    }

    let apps = discovery::scan_applications(&options).await?;
    let report = ScanReport::new(apps);

    match output {
        OutputFormat::Human => print!("{}", report::format_apps(&report.apps)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(report.is_clean())
}

fn emit_licences(
    source: String,
    decoded: licence::DecodeReport,
    variant: Option<String>,
    output: OutputFormat,
) -> Result<()> {
    let classification = variant
        .as_deref()
        .map(|v| licence::classify(&decoded.records, v));
    let report = LicenceReport {
        source,
        decoded,
        variant,
        classification,
    };

    match output {
        OutputFormat::Human => print!("{}", report::format_licences(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Decode the store for an installed version. A missing store is reported
/// as zero records.
pub async fn run_licences(args: &LicencesArgs, config: &Config, output: OutputFormat) -> Result<()> {
    let version = Version::coerce(&args.live_version)
        .with_context(|| format!("Not a version: {}", args.live_version))?;
    let root = args
        .store
        .clone()
        .unwrap_or_else(|| config.licence.store_root());
    let path = licence::unlock_path(&root, &version);

    let decoded = match licence::read_store(&path, config.licence.read_timeout()).await {
        Some(data) => licence::decode_report(&data)
            .with_context(|| format!("Failed to decode licence store: {}", path.display()))?,
        None => licence::DecodeReport::default(),
    };

    emit_licences(path.display().to_string(), decoded, args.variant.clone(), output)
}

/// Decode a store file given directly. Unlike `licences`, a missing file is
/// an error here.
pub async fn run_decode(args: &DecodeArgs, output: OutputFormat) -> Result<()> {
    let data = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let decoded = licence::decode_report(&data)
        .with_context(|| format!("Failed to decode licence store: {}", args.file.display()))?;

    emit_licences(args.file.display().to_string(), decoded, args.variant.clone(), output)
}

pub fn run_config(args: &ConfigArgs, config: &Config) -> Result<()> {
    if args.sample {
        print!("{}", config::generate_sample_config());
        return Ok(());
    }

    let path = if args.init {
        Config::ensure_exists()?
    } else {
        Config::default_path()
    };
    println!("Config: {}", path.display());
    print!("{}", toml::to_string_pretty(config).context("Failed to serialize config")?);
    Ok(())
}
