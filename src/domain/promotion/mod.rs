//! Promotion domain - deciding when a price drop is worth surfacing

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info};

use crate::config::Config;
use crate::shared::types::{Platform, PriceHistoryRecord, PromotionEvent, TrackedGame, TriggerReason};

/// Guards the boundary cases where the rule ratio and the mean do not
/// multiply exactly in binary.
const EPSILON: f64 = 1e-9;

/// Evaluates a game's current prices against its history.
///
/// Two rules, in order. Rule A: current price at or below
/// `rule_a_ratio` x the trailing 30-day average. Rule B (only when A did
/// not fire): current price at or below `rule_b_ratio` x the price from
/// exactly 7 days ago. A game-wide cooldown suppresses repeat events on
/// any platform within `cooldown_days` of the last one.
pub struct PromotionDetector {
    rule_a_ratio: f64,
    rule_b_ratio: f64,
    trailing_window_days: i64,
    weekly_lookback_days: i64,
    cooldown_days: i64,
}

impl PromotionDetector {
    pub fn new(
        rule_a_ratio: f64,
        rule_b_ratio: f64,
        trailing_window_days: i64,
        weekly_lookback_days: i64,
        cooldown_days: i64,
    ) -> Self {
        Self {
            rule_a_ratio,
            rule_b_ratio,
            trailing_window_days,
            weekly_lookback_days,
            cooldown_days,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.rule_a_ratio,
            config.rule_b_ratio,
            config.trailing_window_days,
            config.weekly_lookback_days,
            config.cooldown_days,
        )
    }

    /// Evaluate one game. `history` is that game's records across all
    /// platforms; `last_promotion` is the date of the most recent event for
    /// the game on any platform. Games with no usable current price or no
    /// history are skipped silently. At most one event is produced per call:
    /// the cooldown is game-wide, so a second platform firing the same day
    /// would be suppressed anyway.
    pub fn evaluate(
        &self,
        game: &TrackedGame,
        history: &[PriceHistoryRecord],
        last_promotion: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Vec<PromotionEvent> {
        let today = now.date_naive();

        if let Some(last) = last_promotion {
            if (today - last).num_days() < self.cooldown_days {
                debug!(game = %game.name, %last, "promotion cooldown active, skipping");
                return Vec::new();
            }
        }

        let mut events = Vec::new();
        for platform in Platform::ALL {
            let state = game.platform_price(platform);
            let Some(current) = state.current else { continue };
            if current <= 0 {
                continue;
            }
            let records: Vec<&PriceHistoryRecord> =
                history.iter().filter(|r| r.platform == platform).collect();
            if records.is_empty() {
                continue;
            }

            if let Some(event) = self.check_platform(game, platform, current, &records, today, now)
            {
                info!(
                    game = %game.name,
                    platform = %platform,
                    reason = ?event.reason,
                    price = event.price,
                    "promotion detected"
                );
                events.push(event);
                break;
            }
        }
        events
    }

    fn check_platform(
        &self,
        game: &TrackedGame,
        platform: Platform,
        current: i64,
        records: &[&PriceHistoryRecord],
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Option<PromotionEvent> {
        // Rule A: trailing average over the window up to yesterday. Today's
        // fresh observation is excluded so it cannot dilute its own baseline.
        let window: Vec<i64> = records
            .iter()
            .filter(|r| {
                let age = (today - r.date).num_days();
                age > 0 && age <= self.trailing_window_days
            })
            .map(|r| r.price)
            .collect();
        if !window.is_empty() {
            let mean = window.iter().sum::<i64>() as f64 / window.len() as f64;
            if current as f64 <= self.rule_a_ratio * mean + EPSILON {
                return Some(PromotionEvent {
                    game: game.name.clone(),
                    platform,
                    reason: TriggerReason::Below30DayAverage,
                    price: current,
                    timestamp: now,
                });
            }
        }

        // Rule B: drop against the price recorded exactly a week ago.
        let week_ago = today - Duration::days(self.weekly_lookback_days);
        let prior = records.iter().find(|r| r.date == week_ago)?;
        if current as f64 <= self.rule_b_ratio * prior.price as f64 + EPSILON {
            return Some(PromotionEvent {
                game: game.name.clone(),
                platform,
                reason: TriggerReason::WeeklyDrop,
                price: current,
                timestamp: now,
            });
        }
        None
    }
}
