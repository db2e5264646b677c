// SPDX-License-Identifier: MIT

mod log;
mod progress;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use configdrive::{
    Config, ConfigDriveOptions, ConfigDriveService, MetadataService, build_search_request,
    list_files,
};

use crate::log::LogLevel;

/// Exit code when no config drive is attached.
const EXIT_NOT_FOUND: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "cdtool", version, about = "Config drive discovery tool", long_about = None)]
struct Cli {
    /// TOML file with a [config_drive] section
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only, no spinner
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    search: SearchArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the configured search space.
#[derive(Args, Debug, Default)]
struct SearchArgs {
    /// Content format to look for (iso, vfat). Replaces the configured list
    #[arg(long = "type", value_name = "FORMAT", global = true)]
    types: Vec<String>,

    /// Location to search (cdrom, hdd, partition). Replaces the configured list
    #[arg(long = "location", value_name = "LOCATION", global = true)]
    locations: Vec<String>,

    /// Deprecated: ISO content on physical disks
    #[arg(long, global = true)]
    raw_hdd: bool,

    /// Deprecated: ISO content on optical drives
    #[arg(long, global = true)]
    cdrom: bool,

    /// Deprecated: vfat filesystem on physical disks
    #[arg(long, global = true)]
    vfat: bool,
}

impl SearchArgs {
    fn apply(&self, mut opts: ConfigDriveOptions) -> ConfigDriveOptions {
        if !self.types.is_empty() {
            opts.types = self.types.clone();
        }
        if !self.locations.is_empty() {
            opts.locations = self.locations.clone();
        }
        opts.raw_hdd |= self.raw_hdd;
        opts.cdrom |= self.cdrom;
        opts.vfat |= self.vfat;
        opts
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the search request without touching any device
    Request,
    /// Look for a config drive and list its files
    Probe {
        /// Leave the working directory in place
        #[arg(long)]
        keep: bool,
    },
    /// Print one metadata file to stdout
    Read {
        /// Path relative to the drive root (e.g. openstack/latest/meta_data.json)
        path: String,
    },
}

fn load_options(config: Option<&Path>, search: &SearchArgs) -> anyhow::Result<ConfigDriveOptions> {
    let base = match config {
        Some(path) => Config::from_file(path)?.config_drive,
        None => ConfigDriveOptions::default(),
    };
    Ok(search.apply(base))
}

/// Result of a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    NotFound,
}

impl Outcome {
    fn code(&self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::NotFound => EXIT_NOT_FOUND,
        }
    }
}

/// Loads `service`, runs `f` on it when a drive was found, and cleans up
/// unless `keep` is set and `f` succeeded.
fn with_drive<T>(
    mut service: ConfigDriveService,
    quiet: bool,
    keep: bool,
    f: impl FnOnce(&ConfigDriveService) -> anyhow::Result<T>,
) -> anyhow::Result<Option<T>> {
    let pb = progress::spinner("searching for a config drive", quiet)?;
    let loaded = service.load();
    pb.finish_and_clear();

    let out = match loaded {
        Ok(true) => f(&service).map(Some),
        Ok(false) => Ok(None),
        Err(e) => Err(e.into()),
    };

    if !(keep && matches!(out, Ok(Some(_)))) {
        service.cleanup();
    }
    out
}

fn not_found() -> Outcome {
    eprintln!("{} no config drive found", "[cdtool]".yellow().bold());
    Outcome::NotFound
}

/// Runs `command`, building the service for `probe` and `read` with
/// `make_service`. Command output goes to `out`.
fn run(
    command: Commands,
    options: ConfigDriveOptions,
    quiet: bool,
    make_service: impl FnOnce(ConfigDriveOptions) -> ConfigDriveService,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    match command {
        Commands::Request => {
            let request = build_search_request(&options)?;
            writeln!(out, "{} {request}", "[cdtool]".bold())?;
            for (format, location) in request.pairs() {
                writeln!(out, "  - {format} on {location}")?;
            }
        }
        Commands::Probe { keep } => {
            let found = with_drive(make_service(options), quiet, keep, |service| {
                let dir = service
                    .working_dir()
                    .context("service is active without a working directory")?;
                writeln!(out, "{} config drive copied to {}", "[cdtool]".green().bold(), dir.display())?;
                for file in list_files(dir)? {
                    writeln!(out, "  {}", file.display())?;
                }
                if keep {
                    writeln!(out, "{} kept {}", "[cdtool]".bold(), dir.display())?;
                }
                Ok(())
            })?;
            if found.is_none() {
                return Ok(not_found());
            }
        }
        Commands::Read { path } => {
            let data = with_drive(make_service(options), quiet, false, |service| {
                Ok(service.get_data(&path)?)
            })?;
            let Some(data) = data else {
                return Ok(not_found());
            };
            out.write_all(&data)?;
            out.flush()?;
        }
    }

    Ok(Outcome::Success)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    log::init(LogLevel::from_flags(cli.verbose, cli.quiet));

    let options = load_options(cli.config.as_deref(), &cli.search)?;
    tracing::debug!(?options, "effective config drive options");

    let mut stdout = std::io::stdout().lock();
    let outcome = run(cli.command, options, cli.quiet, ConfigDriveService::new, &mut stdout)?;
    Ok(ExitCode::from(outcome.code()))
}
