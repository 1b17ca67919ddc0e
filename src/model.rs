use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate straight out of the page DOM. The link may still be relative
/// and the date is free-form text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNewsItem {
    pub title: String,
    pub link: String,
    pub date_text: String,
}

/// A news item ready for persistence: absolute link, parsed timestamps.
/// `link` is the dedup key across all persisted records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
}

/// Lifecycle status of a curated-contents row. The scraper only ever creates
/// rows in `Pending`; downstream systems move them forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContentStatus {
    Pending,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Pending => "pending",
        }
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RunReport {
    /// Dry-run: extraction and normalization only, no storage I/O.
    DryRun { count: usize },
    /// Full ingest with exact per-run counters.
    Ingested {
        inserted: usize,
        skipped: usize,
        errors: usize,
    },
}
