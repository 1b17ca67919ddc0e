use crate::model::{ContentStatus, NewsItem};
use anyhow::Result;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

pub type Pool = SqlitePool;

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized).await?;
    // Enable WAL and stricter durability.
    sqlx::query("PRAGMA journal_mode=WAL;").execute(&pool).await?;
    sqlx::query("PRAGMA synchronous=FULL;").execute(&pool).await?;
    Ok(pool)
}

/// For file-backed SQLite URLs, expand a leading `~/` and make sure the
/// parent directory exists. In-memory URLs and foreign schemes pass through.
fn prepare_sqlite_url(url: &str) -> String {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return url.to_string();
    };
    if rest.starts_with(":memory") {
        return url.to_string();
    }
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let (path, query) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path.is_empty() {
        return url.to_string();
    }

    let path = match path.strip_prefix("~/") {
        Some(tail) => match std::env::var("HOME") {
            Ok(home) => format!("{}/{}", home.trim_end_matches('/'), tail),
            Err(_) => path.to_string(),
        },
        None => path.to_string(),
    };
    if let Some(parent) = std::path::Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    match query {
        Some(q) => format!("sqlite://{path}?{q}"),
        None => format!("sqlite://{path}"),
    }
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Resolve the fixed content-source keyword to its row id. `Ok(None)` means
/// the row does not exist, which the pipeline treats as a fatal precondition.
#[instrument(skip(pool))]
pub async fn find_content_source_id(
    pool: &Pool,
    keyword: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM content_sources WHERE keyword = ?")
        .bind(keyword)
        .fetch_optional(pool)
        .await
}

/// Point lookup on the dedup key. One fresh round trip per candidate; item
/// volumes are tens per run, so nothing is cached across items.
#[instrument(skip(pool))]
pub async fn link_exists(pool: &Pool, link: &str) -> Result<bool, sqlx::Error> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM curated_contents WHERE link = ? LIMIT 1")
        .bind(link)
        .fetch_optional(pool)
        .await?;
    Ok(id.is_some())
}

/// Insert one curated-contents row for a new item. Rows start in `pending`
/// with an empty body; downstream systems fill them in later. This module
/// never updates or deletes existing rows.
#[instrument(skip_all, fields(title = %item.title))]
pub async fn insert_curated_content(
    pool: &Pool,
    item: &NewsItem,
    content_source_id: i64,
    source_label: &str,
) -> Result<i64, sqlx::Error> {
    let now = Utc::now();
    let rec = sqlx::query(
        "INSERT INTO curated_contents \
         (title, link, source, content, status, published_at, fetched_at, content_source_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&item.title)
    .bind(&item.link)
    .bind(source_label)
    .bind("")
    .bind(ContentStatus::Pending.as_str())
    .bind(item.published_at)
    .bind(item.fetched_at)
    .bind(content_source_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(rec.get::<i64, _>("id"))
}
