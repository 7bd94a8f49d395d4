//! Sequential scraping run over the active sources.
//!
//! Sources are processed one at a time, in configuration order. A source
//! that cannot be fetched contributes nothing and is reported through a
//! [`StatusEvent::Failed`]; the run always continues with the next source.
//! A lost page of a paginated source is reported as
//! [`StatusEvent::PageFailed`] before the source's own result.
//! The merged result replaces whatever the [`RunContext`] held before.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::aggregate::{filter_by_cutoff, merge_sorted};
use crate::config::Settings;
use crate::models::{
    Article, ItemOutcome, PageFailure, Source, SourceOutcome, SourceReport, StatusEvent,
};
use crate::scrapers::extract::CompiledRecipe;
use crate::scrapers::fetch::PageFetcher;
use crate::sources::SourceRegistry;

/// Receiver of per-source progress.
pub trait StatusSink {
    fn emit(&mut self, event: StatusEvent);
}

impl StatusSink for Vec<StatusEvent> {
    fn emit(&mut self, event: StatusEvent) {
        self.push(event);
    }
}

/// Reports progress through `tracing`.
#[derive(Debug, Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn emit(&mut self, event: StatusEvent) {
        match event {
            StatusEvent::Started { source_id, name } => {
                info!(source = %source_id, %name, "Scraping source")
            }
            StatusEvent::Succeeded { source_id, count } => {
                info!(source = %source_id, count, "Source done")
            }
            StatusEvent::PageFailed {
                source_id,
                url,
                message,
            } => {
                warn!(source = %source_id, %url, %message, "Listing page unavailable")
            }
            StatusEvent::Failed { source_id, message } => {
                warn!(source = %source_id, %message, "Source failed")
            }
        }
    }
}

/// Inputs and outputs of one run, owned by the caller.
pub struct RunContext<'a> {
    pub cutoff: NaiveDate,
    /// Reference point for relative timestamps.
    pub now: NaiveDateTime,
    pub results: Vec<Article>,
    pub sink: &'a mut dyn StatusSink,
}

impl<'a> RunContext<'a> {
    pub fn new(cutoff: NaiveDate, sink: &'a mut dyn StatusSink) -> Self {
        Self::at(cutoff, Local::now().naive_local(), sink)
    }

    pub fn at(cutoff: NaiveDate, now: NaiveDateTime, sink: &'a mut dyn StatusSink) -> Self {
        Self {
            cutoff,
            now,
            results: Vec::new(),
            sink,
        }
    }
}

/// Counters for the log line closing a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub sources_ok: usize,
    pub sources_failed: usize,
    pub items_skipped: usize,
    pub articles: usize,
}

#[derive(Debug, Clone)]
pub struct NewsScraper {
    fetcher: PageFetcher,
    settings: Settings,
}

impl NewsScraper {
    pub fn new(settings: Settings) -> Result<Self, reqwest::Error> {
        Ok(Self {
            fetcher: PageFetcher::new(&settings)?,
            settings,
        })
    }

    /// Scrape every enabled source in `registry` into `ctx.results`.
    ///
    /// # Arguments
    /// * `registry` - Source table; disabled sources are not fetched
    /// * `ctx` - Cutoff, reference time, result slot and status sink
    ///
    /// # Returns
    /// Counters for the run. Articles land in `ctx.results`, replacing its
    /// previous content, and progress goes to `ctx.sink`.
    #[instrument(level = "info", skip_all, fields(cutoff = %ctx.cutoff))]
    pub async fn run(&self, registry: &SourceRegistry, ctx: &mut RunContext<'_>) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut per_source: Vec<Vec<Article>> = Vec::new();

        for source in registry.active() {
            ctx.sink.emit(StatusEvent::Started {
                source_id: source.id.clone(),
                name: source.display_name.clone(),
            });

            let outcome = match CompiledRecipe::compile(source) {
                Ok(recipe) => self.scrape_source(source, &recipe).await,
                Err(e) => {
                    summary.sources_failed += 1;
                    ctx.sink.emit(StatusEvent::Failed {
                        source_id: source.id.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            match outcome {
                SourceOutcome::Extracted(report) => {
                    summary.sources_ok += 1;
                    summary.items_skipped += report.skipped;
                    for page in report.failed_pages {
                        ctx.sink.emit(StatusEvent::PageFailed {
                            source_id: source.id.clone(),
                            url: page.url,
                            message: page.message,
                        });
                    }
                    let kept = filter_by_cutoff(report.items, ctx.cutoff, ctx.now);
                    ctx.sink.emit(StatusEvent::Succeeded {
                        source_id: source.id.clone(),
                        count: kept.len(),
                    });
                    per_source.push(kept);
                }
                SourceOutcome::Failed(e) => {
                    summary.sources_failed += 1;
                    ctx.sink.emit(StatusEvent::Failed {
                        source_id: source.id.clone(),
                        message: format!("{}: {}", source.display_name, e),
                    });
                }
            }

            pause(self.settings.source_pause_ms).await;
        }

        ctx.results = merge_sorted(per_source);
        summary.articles = ctx.results.len();
        info!(
            ok = summary.sources_ok,
            failed = summary.sources_failed,
            skipped = summary.items_skipped,
            articles = summary.articles,
            "Run complete"
        );
        summary
    }

    /// Fetch and extract every page of one source.
    #[instrument(level = "info", skip_all, fields(source = %source.id))]
    pub async fn scrape_source(&self, source: &Source, recipe: &CompiledRecipe) -> SourceOutcome {
        let mut report = SourceReport::default();
        let mut fetched_pages = 0usize;
        let mut last_error = None;

        for (index, url) in source.page_urls().into_iter().enumerate() {
            if index > 0 {
                pause(self.settings.page_pause_ms).await;
            }

            let html = match self.fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    debug!(%url, error = %e, "Listing page unavailable");
                    report.failed_pages.push(PageFailure {
                        url: url.clone(),
                        message: e.to_string(),
                    });
                    last_error = Some(e);
                    continue;
                }
            };
            fetched_pages += 1;

            for outcome in recipe.extract_page(&html) {
                match outcome {
                    ItemOutcome::Extracted(raw) => report.items.push(raw),
                    ItemOutcome::Skipped(reason) => {
                        debug!(%url, ?reason, "Skipped item");
                        report.skipped += 1;
                    }
                }
            }
        }

        match last_error {
            Some(e) if fetched_pages == 0 => SourceOutcome::Failed(e),
            _ => {
                info!(
                    items = report.items.len(),
                    skipped = report.skipped,
                    failed_pages = report.failed_pages.len(),
                    "Extracted source"
                );
                SourceOutcome::Extracted(report)
            }
        }
    }
}

async fn pause(millis: u64) {
    if millis > 0 {
        sleep(Duration::from_millis(millis)).await;
    }
}
