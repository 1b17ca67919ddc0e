//! Ingest pipeline: render → extract → normalize → dedupe → persist.
//!
//! One invocation is one linear run. Per-item work happens strictly in
//! document order so the reported counters are deterministic, and the single
//! storage connection is never used concurrently.

use crate::config::Config;
use crate::db::{self, Pool};
use crate::error::IngestError;
use crate::extract::{extract_items, NEWS_CONTAINER_SELECTOR};
use crate::model::{NewsItem, RunReport};
use crate::normalize::normalize;
use crate::render::PageRenderer;
use chrono::Utc;
use tracing::{info, instrument, warn};

/// The one page this service targets.
pub const NEWS_PAGE_URL: &str = "https://ipindia.gov.in/arched-news.htm";
/// Origin prepended to relative links found on the listing.
pub const BASE_ORIGIN: &str = "https://ipindia.gov.in";
/// Content-source row every persisted record references.
pub const SOURCE_KEYWORD: &str = "IPIndia News";
/// Label stamped into each record's `source` column.
pub const SOURCE_LABEL: &str = "IPIndia";

/// How a run interacts with storage. Dry-run carries no pool at all, so it
/// cannot perform storage I/O by construction.
#[derive(Clone, Copy)]
pub enum RunMode<'a> {
    DryRun,
    Ingest(&'a Pool),
}

/// Execute one full pipeline run.
///
/// Fatal errors (navigation, container timeout, unknown content source,
/// storage loss mid-run) abort and surface to the caller; the renderer has
/// already released its browser session by then. Per-item failures (bad
/// date text, a failed insert) are recorded in the `errors` counter and
/// never block the remaining items.
#[instrument(skip_all)]
pub async fn run_pipeline(
    renderer: &dyn PageRenderer,
    mode: RunMode<'_>,
    cfg: &Config,
) -> Result<RunReport, IngestError> {
    // Already checked by config::validate; still fatal if it slips through.
    let offset = cfg
        .publication_offset()
        .map_err(|err| IngestError::Config(err.to_string()))?;

    info!(url = NEWS_PAGE_URL, "starting ingest run");
    let html = renderer.render(NEWS_PAGE_URL, NEWS_CONTAINER_SELECTOR).await?;

    let raw_items = extract_items(&html, NEWS_CONTAINER_SELECTOR);
    info!(count = raw_items.len(), "extracted raw news items");

    let fetched_at = Utc::now();
    let mut errors = 0usize;
    let mut items: Vec<NewsItem> = Vec::with_capacity(raw_items.len());
    for raw in raw_items {
        match normalize(raw, BASE_ORIGIN, offset, fetched_at) {
            Ok(item) => items.push(item),
            Err(err) => {
                warn!(%err, "skipping item that failed normalization");
                errors += 1;
            }
        }
    }

    let pool = match mode {
        RunMode::DryRun => {
            info!(count = items.len(), "dry run, skipping storage");
            return Ok(RunReport::DryRun { count: items.len() });
        }
        RunMode::Ingest(pool) => pool,
    };

    let source_id = db::find_content_source_id(pool, SOURCE_KEYWORD)
        .await
        .map_err(IngestError::StorageUnavailable)?
        .ok_or_else(|| IngestError::UnknownSource(SOURCE_KEYWORD.to_string()))?;

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for item in &items {
        // A failed dedup lookup means the connection is gone; abort the rest.
        if db::link_exists(pool, &item.link)
            .await
            .map_err(IngestError::StorageUnavailable)?
        {
            info!(link = %item.link, "skipping duplicate");
            skipped += 1;
            continue;
        }
        match db::insert_curated_content(pool, item, source_id, SOURCE_LABEL).await {
            Ok(_) => {
                info!(title = %item.title, "inserted news item");
                inserted += 1;
            }
            Err(err) => {
                let err = IngestError::Insert {
                    title: item.title.clone(),
                    source: err,
                };
                warn!(%err, "failed to insert news item");
                errors += 1;
            }
        }
    }

    info!(inserted, skipped, errors, "ingest run finished");
    Ok(RunReport::Ingested {
        inserted,
        skipped,
        errors,
    })
}
