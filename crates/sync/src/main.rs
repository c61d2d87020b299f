#![forbid(unsafe_code)]

mod config;
mod feed;

use anyhow::{Context, bail};
use clap::Parser;
use config::Cli;
use gs_core::GroupCatalog;
use gs_storage::{ApplyMode, SqliteStore};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut store = SqliteStore::open(&cli.db)
        .with_context(|| format!("opening gravity database {}", cli.db.display()))?;
    log::info!("Opened DB: '{}'", cli.db.display());

    let source = cli.feed_source();
    log::info!("Fetching adlists from {source}");
    let entries = feed::fetch(&source).with_context(|| format!("loading feed {source}"))?;
    log::info!("Fetched {} adlist(s)", entries.len());

    if entries.is_empty() && !cli.allow_empty {
        bail!("feed {source} has no rows; pass --allow-empty to disable every managed adlist");
    }

    let mode = if cli.dry_run {
        ApplyMode::DryRun
    } else {
        ApplyMode::Commit
    };
    let report = store
        .reconcile(&entries, &GroupCatalog::well_known(), mode)
        .context("reconciling adlists")?;

    log::info!("Added {} missing adlist(s)", report.inserted);
    log::info!("Disabled {} extraneous adlist(s)", report.disabled);
    log::info!(
        "Inserted {} adlist/group mapping(s), {} changed",
        report.memberships,
        report.membership_edits
    );
    if report.is_noop() {
        log::info!("Already in sync");
    }

    if cli.json {
        println!("{}", serde_json::to_string(&report)?);
    }

    Ok(())
}
