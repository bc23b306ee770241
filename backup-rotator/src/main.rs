//! Backup Rotator - Main entry point
//!
//! Meant to run from cron shortly before the backup job, e.g.
//! `30 * * * * backup-rotator run`.

use anyhow::{Context, Result};
use backup_rotator::fs::{ArchiveStore, DryRunStore, LocalStore};
use backup_rotator::rotation::inventory::{inventory, render_table};
use backup_rotator::rotation::tier::ArchiveLayout;
use backup_rotator::{utils, Config, Rotator};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, or INI with a [Settings] section)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Inbox directory (overrides config)
    #[arg(long, value_name = "DIR", global = true)]
    backups_dir: Option<PathBuf>,

    /// Archive root directory (overrides config)
    #[arg(long, value_name = "DIR", global = true)]
    archives_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take in new arrivals and rotate every account (default)
    Run {
        /// Log what would happen without moving or deleting anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the backups held in each account and tier
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = args.backups_dir {
        config.backups_dir = dir;
    }
    if let Some(dir) = args.archives_dir {
        config.archives_dir = dir;
    }

    // Initialize logging
    let log_level = args.log_level.as_deref().unwrap_or(&config.log_level);
    utils::logger::init(log_level)?;

    match args.command.unwrap_or(Command::Run { dry_run: false }) {
        Command::Run { dry_run } => run(&config, dry_run),
        Command::List { json } => list(&config, json),
    }
}

fn run(config: &Config, dry_run: bool) -> Result<()> {
    tracing::info!(
        "Starting backup-rotator v{} (inbox: {}, archives: {})",
        env!("CARGO_PKG_VERSION"),
        config.backups_dir.display(),
        config.archives_dir.display()
    );

    let store: &dyn ArchiveStore = if dry_run {
        tracing::info!("Dry run: no files will be moved or deleted");
        &DryRunStore
    } else {
        &LocalStore
    };

    Rotator::new(config, store)?
        .run(Local::now().naive_local())
        .context("rotation aborted")?;
    Ok(())
}

fn list(config: &Config, json: bool) -> Result<()> {
    let accounts = inventory(&ArchiveLayout::new(&config.archives_dir))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
    } else {
        print!("{}", render_table(&accounts));
    }
    Ok(())
}
