//! Common types used across the application

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Storefront platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Steam,
    Psn,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Steam, Platform::Psn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Steam => "Steam",
            Platform::Psn => "PSN",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-platform price state for a tracked game.
///
/// Prices are whole currency units. `None` is the "not found" sentinel,
/// distinct from `Some(0)` which means the game is free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformPrice {
    pub current: Option<i64>,
    pub historical_low: Option<i64>,
}

/// A game on the tracked list with its per-platform price state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedGame {
    pub name: String,
    #[serde(default)]
    pub platforms: HashMap<Platform, PlatformPrice>,
    #[serde(default)]
    pub last_updated: Option<NaiveDate>,
}

impl TrackedGame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            platforms: HashMap::new(),
            last_updated: None,
        }
    }

    pub fn platform_price(&self, platform: Platform) -> PlatformPrice {
        self.platforms.get(&platform).copied().unwrap_or_default()
    }
}

/// One raw result tile as parsed from a storefront search page.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub price: Option<i64>,
    pub url: Option<String>,
}

impl SearchHit {
    /// Sentinel hit returned when a search yields nothing usable.
    pub fn not_found() -> Self {
        Self {
            title: String::new(),
            price: None,
            url: None,
        }
    }
}

/// Best candidate for a game on one platform, as selected by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub platform: Platform,
    pub matched_title: String,
    pub price: Option<i64>,
    pub source_url: Option<String>,
    /// 0-100 token-order-insensitive similarity against the query title.
    pub similarity: u8,
}

/// One price observation for a game on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryRecord {
    pub game: String,
    pub platform: Platform,
    pub date: NaiveDate,
    pub price: i64,
}

/// What made a price change significant enough to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerReason {
    Below30DayAverage,
    WeeklyDrop,
}

/// Signal that a current price is a meaningful discount.
///
/// Ownership passes to the notification collaborator once emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionEvent {
    pub game: String,
    pub platform: Platform,
    pub reason: TriggerReason,
    pub price: i64,
    pub timestamp: DateTime<Utc>,
}
