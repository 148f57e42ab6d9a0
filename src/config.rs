use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Chrome desktop UA; storefront search pages gate on a realistic browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Engine configuration, loadable from a TOML file with per-field defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Canonical similarity cutoff: a candidate scoring exactly this is kept.
    pub similarity_threshold: u8,
    /// Result tiles parsed per storefront search, clamped to 3..=5.
    pub max_candidates: usize,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub request_timeout_ms: u64,
    /// Pause between games to stay under storefront rate limits.
    pub inter_game_delay_ms: u64,
    pub cache_ttl_secs: u64,
    /// Rule A: current price at or below this fraction of the 30-day mean.
    pub rule_a_ratio: f64,
    /// Rule B: current price at or below this fraction of last week's price.
    pub rule_b_ratio: f64,
    pub trailing_window_days: i64,
    pub weekly_lookback_days: i64,
    pub cooldown_days: i64,
    /// Storefront country code (region pricing).
    pub country: String,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            similarity_threshold: 85,
            max_candidates: 5,
            max_retries: 3,
            retry_base_delay_ms: 2000,
            request_timeout_ms: 15_000,
            inter_game_delay_ms: 500,
            cache_ttl_secs: 300,
            rule_a_ratio: 0.80,
            rule_b_ratio: 0.90,
            trailing_window_days: 30,
            weekly_lookback_days: 7,
            cooldown_days: 30,
            country: "br".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read config {}", path.as_ref().display()))?;
        let cfg: Self = toml::from_str(&s).context("parse config TOML")?;
        Ok(cfg)
    }

    pub fn clamped_candidates(&self) -> usize {
        self.max_candidates.clamp(3, 5)
    }
}
