//! Storefront scrapers - blocking HTTP plus per-store HTML parsing
//!
//! Each storefront keeps its selectors and request shape in its own file;
//! the shared part is the retrying fetch. All calls block the batch
//! thread on purpose: games are scraped strictly sequentially.

pub mod psn;
pub mod steam;

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use tracing::warn;

use crate::config::Config;
use crate::shared::errors::ScrapeError;

pub use psn::PsnScraper;
pub use steam::SteamScraper;

/// Blocking HTTP client with a bounded retry policy.
///
/// Transient failures (connect errors, timeouts, non-2xx) retry up to
/// `max_retries` times; the delay before retry `k` is `k x base_delay`.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpFetcher {
    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    /// Delay before retrying after the given 1-based failed attempt.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// GET a page body, retrying transient failures.
    ///
    /// `build` recreates the request for each attempt (builders are
    /// consumed by `send`).
    pub fn get_with_retry<F>(&self, build: F) -> Result<String, ScrapeError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        for attempt in 1..=self.max_retries {
            match build(&self.client).send() {
                Ok(response) if response.status().is_success() => match response.text() {
                    Ok(body) => return Ok(body),
                    Err(e) => warn!(attempt, error = %e, "failed to read response body"),
                },
                Ok(response) => {
                    warn!(attempt, status = %response.status(), "storefront returned error status");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "request failed");
                }
            }
            if attempt < self.max_retries {
                thread::sleep(self.retry_delay(attempt));
            }
        }
        Err(ScrapeError::RetriesExhausted(self.max_retries))
    }
}
