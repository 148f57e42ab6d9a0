//! Pricewatch - Steam/PSN price tracking and promotion detection
//! Built with Domain-Driven Design principles

pub mod cache;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod runner;
pub mod shared;

// Re-export main types for convenience
pub use cache::{Clock, SystemClock, TtlCache};
pub use config::Config;
pub use domain::matching::{PriceAggregator, StorefrontScraper};
pub use domain::promotion::PromotionDetector;
pub use infrastructure::scrapers::{HttpFetcher, PsnScraper, SteamScraper};
pub use infrastructure::store::{HistoricalPriceStore, JsonFileRepository, PriceRepository};
pub use runner::{BatchRunner, BatchReport};
