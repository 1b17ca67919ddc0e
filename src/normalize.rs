//! Canonicalization of raw news records: absolute links, parsed timestamps.

use crate::error::IngestError;
use crate::model::{NewsItem, RawNewsItem};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// Make a raw record canonical.
///
/// The link rule matches what the live page serves: anything not already
/// starting with `http` is a path-relative reference that gets the fixed
/// base origin prepended. The date text is interpreted as a civil date in
/// the configured publisher offset, at midnight, converted to UTC.
///
/// An unparseable date yields [`IngestError::DateParse`] tagged with the
/// record so the caller can skip just that item.
pub fn normalize(
    raw: RawNewsItem,
    base_origin: &str,
    offset: FixedOffset,
    fetched_at: DateTime<Utc>,
) -> Result<NewsItem, IngestError> {
    let published_at = parse_publication_date(&raw.date_text, offset).ok_or_else(|| {
        IngestError::DateParse {
            title: raw.title.clone(),
            date_text: raw.date_text.clone(),
        }
    })?;

    Ok(NewsItem {
        link: absolutize(&raw.link, base_origin),
        title: raw.title,
        published_at,
        fetched_at,
    })
}

/// Resolve a possibly-relative link against the fixed base origin.
/// Links already carrying an `http` scheme pass through unchanged; a single
/// leading slash is stripped before joining.
pub fn absolutize(link: &str, base_origin: &str) -> String {
    if link.starts_with("http") {
        return link.to_string();
    }
    let base = base_origin.trim_end_matches('/');
    let path = link.strip_prefix('/').unwrap_or(link);
    format!("{base}/{path}")
}

/// Parse free-form listing dates like `January 15, 2024`. Abbreviated month
/// names and missing zero-padding are accepted.
fn parse_publication_date(date_text: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let text = date_text.trim();
    let date = ["%B %d, %Y", "%b %d, %Y", "%B %d %Y", "%d %B %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())?;
    let midnight = date.and_time(NaiveTime::MIN);
    offset
        .from_local_datetime(&midnight)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
