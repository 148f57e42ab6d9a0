//! Error handling for the application

use thiserror::Error;

/// Scraping-related errors
///
/// These never escape a scraper's `search`: after the retry budget is spent
/// they are downgraded to a "not found" sentinel hit.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("retries exhausted after {0} attempts")]
    RetriesExhausted(u32),
}

/// Persistence-related errors
///
/// A commit failure is fatal for the batch run; the external scheduler is
/// expected to retry the whole batch on its next cycle.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("library file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid library data: {0}")]
    Format(#[from] serde_json::Error),
}
