//! Scraper service for the IPIndia archived-news listing.
//!
//! The pipeline renders the listing page in a headless browser, extracts
//! structured news items, normalizes links and dates, and inserts records
//! that have not been seen before into the curated-contents store.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod render;
