use thiserror::Error;

/// Failure taxonomy for a single ingest run.
///
/// `Navigation`, `SelectorTimeout`, `UnknownSource` and `StorageUnavailable`
/// abort the run. `DateParse` and `Insert` are isolated to one item: the
/// orchestrator records them and keeps going.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("page navigation failed: {0}")]
    Navigation(String),

    #[error("container `{selector}` did not appear within {waited_secs}s")]
    SelectorTimeout { selector: String, waited_secs: u64 },

    #[error("unparseable date `{date_text}` on item `{title}`")]
    DateParse { title: String, date_text: String },

    #[error("content source `{0}` not found")]
    UnknownSource(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] sqlx::Error),

    #[error("failed to insert `{title}`: {source}")]
    Insert {
        title: String,
        #[source]
        source: sqlx::Error,
    },
}

impl IngestError {
    /// Whether this error aborts the whole run or only skips one item.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            IngestError::DateParse { .. } | IngestError::Insert { .. }
        )
    }
}
