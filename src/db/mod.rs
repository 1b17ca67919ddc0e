//! Database module: SQL repository for the curated-contents store.
//!
//! Repository functions return plain `sqlx::Error`; the pipeline decides
//! which failures are fatal (dedup lookups, source resolution) and which are
//! isolated to one record (inserts).

pub mod repo;

pub use repo::*;
