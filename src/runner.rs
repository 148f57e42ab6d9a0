//! Batch runner - one full scrape-and-update cycle over the tracked list
//!
//! Strictly sequential and blocking: one game at a time, a fixed pause
//! between games, no self-scheduling. An external scheduler (cron or a
//! worker loop) triggers runs and serializes concurrent invocations.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::cache::{Clock, TtlCache};
use crate::config::Config;
use crate::domain::matching::PriceAggregator;
use crate::domain::promotion::PromotionDetector;
use crate::infrastructure::store::{HistoricalPriceStore, LibrarySnapshot, PriceRepository};
use crate::shared::types::{Platform, PromotionEvent};

const LIBRARY_CACHE_KEY: &str = "library";

/// Outcome of one batch run, serialized for the caller.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub games_processed: usize,
    pub games_skipped: usize,
    pub quotes_found: usize,
    pub promotions: Vec<PromotionEvent>,
}

/// Drives one cycle: scrape, select, record, detect, commit - per game.
pub struct BatchRunner<R: PriceRepository> {
    aggregator: PriceAggregator,
    detector: PromotionDetector,
    repository: R,
    clock: Box<dyn Clock>,
    inter_game_delay: Duration,
    library_cache: TtlCache<String, LibrarySnapshot>,
}

impl<R: PriceRepository> BatchRunner<R> {
    pub fn new(
        aggregator: PriceAggregator,
        detector: PromotionDetector,
        repository: R,
        clock: Box<dyn Clock>,
        config: &Config,
    ) -> Self {
        Self {
            aggregator,
            detector,
            repository,
            clock,
            inter_game_delay: Duration::from_millis(config.inter_game_delay_ms),
            library_cache: TtlCache::new(config.cache_ttl_secs),
        }
    }

    /// Run one batch. A scrape or match failure for one game never aborts
    /// the rest; a repository commit failure is fatal for the run and the
    /// scheduler is expected to retry the whole batch next cycle.
    pub fn run(&mut self) -> Result<BatchReport> {
        let started_at = self.clock.now();
        let snapshot = self.load_library(started_at)?;
        let mut store = HistoricalPriceStore::from_snapshot(snapshot);

        let names = store.game_names();
        info!(games = names.len(), "batch run starting");

        let mut report = BatchReport {
            started_at,
            finished_at: started_at,
            games_processed: 0,
            games_skipped: 0,
            quotes_found: 0,
            promotions: Vec::new(),
        };

        for (index, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                report.games_skipped += 1;
                continue;
            }
            info!(game = %name, "processing");

            let quotes = self.aggregator.best_match(name);
            report.quotes_found += quotes.len();

            let now = self.clock.now();
            let today = now.date_naive();
            for platform in Platform::ALL {
                let price = quotes.get(&platform).and_then(|q| q.price);
                store.record_observation(name, platform, price, today);
            }

            let history = store.history_for(name);
            let last_promotion = store.last_promotion(name);
            let events = match store.game(name) {
                Some(game) => self.detector.evaluate(game, &history, last_promotion, now),
                None => Vec::new(),
            };
            if !events.is_empty() {
                store.mark_promotion(name, today);
            }
            report.promotions.extend(events);

            if let Some(update) = store.game_update(name) {
                self.repository
                    .commit_game(&update)
                    .with_context(|| format!("commit game {name}"))
                    .map_err(|e| {
                        error!(game = %name, "commit failed, aborting run");
                        e
                    })?;
            }
            report.games_processed += 1;

            if index + 1 < names.len() {
                thread::sleep(self.inter_game_delay);
            }
        }

        self.library_cache.invalidate(&LIBRARY_CACHE_KEY.to_string());
        report.finished_at = self.clock.now();
        info!(
            processed = report.games_processed,
            promotions = report.promotions.len(),
            "batch run finished"
        );
        Ok(report)
    }

    /// The tracked list, from cache when a recent run already loaded it.
    fn load_library(&mut self, now: DateTime<Utc>) -> Result<LibrarySnapshot> {
        let key = LIBRARY_CACHE_KEY.to_string();
        if let Some(snapshot) = self.library_cache.get(&key, now) {
            info!("tracked list served from cache");
            return Ok(snapshot);
        }
        let snapshot = self.repository.load().context("load tracked game list")?;
        self.library_cache.insert(key, snapshot.clone(), now);
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::matching::StorefrontScraper;
    use crate::infrastructure::store::GameUpdate;
    use crate::shared::errors::StoreError;
    use crate::shared::types::{PriceHistoryRecord, SearchHit, TrackedGame, TriggerReason};
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io;
    use std::rc::Rc;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap()
    }

    /// Scraper stub: canned hits per queried title, empty-handed otherwise.
    struct StubScraper {
        platform: Platform,
        by_title: HashMap<String, Vec<SearchHit>>,
    }

    impl StorefrontScraper for StubScraper {
        fn platform(&self) -> Platform {
            self.platform
        }

        fn search(&self, title: &str) -> Vec<SearchHit> {
            self.by_title
                .get(title)
                .cloned()
                .unwrap_or_else(|| vec![SearchHit::not_found()])
        }
    }

    #[derive(Default)]
    struct MemoryRepo {
        snapshot: LibrarySnapshot,
        commits: Rc<RefCell<Vec<GameUpdate>>>,
        fail_commits: bool,
    }

    impl PriceRepository for MemoryRepo {
        fn load(&mut self) -> Result<LibrarySnapshot, StoreError> {
            Ok(self.snapshot.clone())
        }

        fn commit_game(&mut self, update: &GameUpdate) -> Result<(), StoreError> {
            if self.fail_commits {
                return Err(StoreError::Io(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.commits.borrow_mut().push(update.clone());
            Ok(())
        }
    }

    fn steam_hit(title: &str, price: i64) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            price: Some(price),
            url: Some("https://store.steampowered.com/app/1".to_string()),
        }
    }

    fn runner_with(
        snapshot: LibrarySnapshot,
        steam_hits: HashMap<String, Vec<SearchHit>>,
        fail_commits: bool,
    ) -> (BatchRunner<MemoryRepo>, Rc<RefCell<Vec<GameUpdate>>>) {
        let commits = Rc::new(RefCell::new(Vec::new()));
        let repo = MemoryRepo {
            snapshot,
            commits: Rc::clone(&commits),
            fail_commits,
        };
        let aggregator = PriceAggregator::new(
            vec![
                Box::new(StubScraper {
                    platform: Platform::Steam,
                    by_title: steam_hits,
                }),
                Box::new(StubScraper {
                    platform: Platform::Psn,
                    by_title: HashMap::new(),
                }),
            ],
            85,
        );
        let mut config = Config::default();
        config.inter_game_delay_ms = 0;
        let runner = BatchRunner::new(
            aggregator,
            PromotionDetector::from_config(&config),
            repo,
            Box::new(FixedClock(now())),
            &config,
        );
        (runner, commits)
    }

    #[test]
    fn test_failed_platform_never_aborts_the_batch() {
        let snapshot = LibrarySnapshot {
            games: vec![TrackedGame::new("Celeste"), TrackedGame::new("Unknown Game")],
            ..Default::default()
        };
        let mut hits = HashMap::new();
        hits.insert("Celeste".to_string(), vec![steam_hit("Celeste", 36)]);

        let (mut runner, commits) = runner_with(snapshot, hits, false);
        let report = runner.run().unwrap();

        assert_eq!(report.games_processed, 2);
        assert_eq!(commits.borrow().len(), 2);

        let committed = commits.borrow();
        let celeste = &committed[0].game;
        assert_eq!(celeste.platform_price(Platform::Steam).current, Some(36));
        assert_eq!(celeste.platform_price(Platform::Psn).current, None);
        assert_eq!(celeste.last_updated, Some(now().date_naive()));

        // both retries exhausted on every platform: current price cleared
        let unknown = &committed[1].game;
        assert_eq!(unknown.platform_price(Platform::Steam).current, None);
    }

    #[test]
    fn test_blank_names_are_skipped() {
        let snapshot = LibrarySnapshot {
            games: vec![TrackedGame::new("   "), TrackedGame::new("Celeste")],
            ..Default::default()
        };
        let mut hits = HashMap::new();
        hits.insert("Celeste".to_string(), vec![steam_hit("Celeste", 36)]);

        let (mut runner, commits) = runner_with(snapshot, hits, false);
        let report = runner.run().unwrap();

        assert_eq!(report.games_skipped, 1);
        assert_eq!(report.games_processed, 1);
        assert_eq!(commits.borrow().len(), 1);
    }

    #[test]
    fn test_promotion_flows_into_report_and_commit() {
        let today = now().date_naive();
        let history: Vec<PriceHistoryRecord> = (1..=10)
            .map(|d| PriceHistoryRecord {
                game: "Celeste".to_string(),
                platform: Platform::Steam,
                date: today - ChronoDuration::days(d),
                price: 100,
            })
            .collect();
        let snapshot = LibrarySnapshot {
            games: vec![TrackedGame::new("Celeste")],
            history,
            ..Default::default()
        };
        let mut hits = HashMap::new();
        hits.insert("Celeste".to_string(), vec![steam_hit("Celeste", 70)]);

        let (mut runner, commits) = runner_with(snapshot, hits, false);
        let report = runner.run().unwrap();

        assert_eq!(report.promotions.len(), 1);
        assert_eq!(report.promotions[0].reason, TriggerReason::Below30DayAverage);
        assert_eq!(report.promotions[0].price, 70);
        assert_eq!(commits.borrow()[0].last_promotion, Some(today));
    }

    #[test]
    fn test_commit_failure_is_fatal() {
        let snapshot = LibrarySnapshot {
            games: vec![TrackedGame::new("Celeste")],
            ..Default::default()
        };
        let mut hits = HashMap::new();
        hits.insert("Celeste".to_string(), vec![steam_hit("Celeste", 36)]);

        let (mut runner, _) = runner_with(snapshot, hits, true);
        assert!(runner.run().is_err());
    }

    #[test]
    fn test_empty_library_is_a_clean_run() {
        let (mut runner, commits) = runner_with(LibrarySnapshot::default(), HashMap::new(), false);
        let report = runner.run().unwrap();

        assert_eq!(report.games_processed, 0);
        assert!(commits.borrow().is_empty());
    }
}
