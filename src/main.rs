//! # vn_market_news
//!
//! Collects stock market headlines from Vietnamese financial news sites
//! (CafeF, VietStock, Người Quan Sát, Báo Mới), keeps those published on or
//! after a cutoff day, and presents them newest first.
//!
//! ## Usage
//!
//! ```sh
//! vn_market_news --date 2024-03-05 -j ./json -m ./md
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: built-in sources, plus any from `config.yaml` or
//!    `--add-source`, narrowed by `--only` / `--skip`
//! 2. **Scraping**: each active source in turn, listing page by listing page
//! 3. **Normalizing**: relative times ("5 phút trước") become timestamps,
//!    older articles are dropped, the rest are merged and sorted
//! 4. **Output**: Markdown listing, CSV export, optional JSON export

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod aggregate;
mod cli;
mod config;
mod errors;
mod models;
mod outputs;
mod scrapers;
mod sources;
mod timeparse;
mod utils;

use cli::Cli;
use config::ConfigFile;
use errors::ConfigError;
use outputs::{csv, json, markdown};
use scrapers::run::{LogSink, NewsScraper, RunContext};
use sources::{NewSource, SourceRegistry};
use utils::ensure_writable_dir;

/// Build the source table for this run from built-ins, config and CLI flags.
fn build_registry(args: &Cli, config: &ConfigFile) -> Result<SourceRegistry, ConfigError> {
    let mut registry = SourceRegistry::builtin();

    for entry in &config.sources {
        let enabled = entry.enabled;
        let id = registry.add(NewSource::from(entry.clone()))?.id.clone();
        if !enabled {
            registry.set_enabled(&id, false)?;
        }
    }
    for spec in &args.add_source {
        registry.add(NewSource::from_spec(spec)?)?;
    }

    if !args.only.is_empty() {
        for id in &args.only {
            if registry.get(id).is_none() {
                return Err(ConfigError::UnknownSource(id.clone()));
            }
        }
        let ids: Vec<String> = registry.sources().iter().map(|s| s.id.clone()).collect();
        for id in ids {
            registry.set_enabled(&id, args.only.contains(&id))?;
        }
    }
    for id in &args.skip {
        registry.set_enabled(id, false)?;
    }

    Ok(registry)
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("vn_market_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let today = Local::now().date_naive();
    let cutoff = args.date.unwrap_or(today);
    if cutoff > today {
        error!(%cutoff, %today, "Cutoff date is in the future");
        return Err(format!("cutoff date {} is after today ({})", cutoff, today).into());
    }

    let config = match &args.config {
        Some(path) => ConfigFile::load(path).await?,
        None => ConfigFile::default(),
    };
    let registry = build_registry(&args, &config)?;

    let active: Vec<&str> = registry.active().map(|s| s.id.as_str()).collect();
    if active.is_empty() {
        warn!("No source selected; nothing to scrape");
        return Ok(());
    }
    info!(%cutoff, sources = ?active, "Starting run");

    // Fail before scraping if an export cannot be written.
    ensure_writable_dir(&args.csv_output_dir).await?;
    if let Some(dir) = &args.json_output_dir {
        ensure_writable_dir(dir).await?;
    }
    if let Some(dir) = &args.markdown_output_dir {
        ensure_writable_dir(dir).await?;
    }

    // ---- Scrape ----
    let scraper = NewsScraper::new(config.settings.clone())?;
    let mut sink = LogSink;
    let mut ctx = RunContext::new(cutoff, &mut sink);
    scraper.run(&registry, &mut ctx).await;
    let articles = ctx.results;

    // ---- Outputs ----
    let shown = markdown::filter_by_sources(&articles, &args.show_source);
    let listing = markdown::render(&shown, cutoff);
    match &args.markdown_output_dir {
        Some(dir) => {
            markdown::write_markdown_file(&listing, cutoff, dir).await?;
        }
        None => println!("{}", listing),
    }

    let csv_path = csv::write_csv_file(&articles, &args.csv_output_dir, cutoff).await?;
    info!(path = %csv_path, "CSV export ready");

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = json::write_results(&articles, cutoff, dir).await {
            error!(error = %e, "Failed to write JSON export");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        articles = articles.len(),
        "Execution complete"
    );
    Ok(())
}
