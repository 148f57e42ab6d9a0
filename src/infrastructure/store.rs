//! Price persistence - in-run working set and the repository port
//!
//! The engine mutates an in-memory [`HistoricalPriceStore`] while a batch
//! runs and commits each game through a [`PriceRepository`] as soon as that
//! game is done, so a crash mid-run loses at most the in-flight game.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::shared::errors::StoreError;
use crate::shared::types::{Platform, PriceHistoryRecord, TrackedGame};

/// Everything the persistence collaborator knows about the tracked library.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    pub games: Vec<TrackedGame>,
    #[serde(default)]
    pub history: Vec<PriceHistoryRecord>,
    #[serde(default)]
    pub last_promotions: HashMap<String, NaiveDate>,
}

/// One game's fully updated state, ready to persist.
#[derive(Debug, Clone)]
pub struct GameUpdate {
    pub game: TrackedGame,
    pub history: Vec<PriceHistoryRecord>,
    pub last_promotion: Option<NaiveDate>,
}

/// Port to the external persistence collaborator.
pub trait PriceRepository {
    fn load(&mut self) -> Result<LibrarySnapshot, StoreError>;
    fn commit_game(&mut self, update: &GameUpdate) -> Result<(), StoreError>;
}

/// Per-run working set of tracked games, their history, and promotion dates.
///
/// Owns every mutation of price state. `historical_low` only ever moves
/// down; the per-day history keeps at most one record per (game, platform,
/// date) - a same-day re-observation overwrites instead of appending.
pub struct HistoricalPriceStore {
    order: Vec<String>,
    games: HashMap<String, TrackedGame>,
    history: Vec<PriceHistoryRecord>,
    last_promotions: HashMap<String, NaiveDate>,
}

impl HistoricalPriceStore {
    pub fn from_snapshot(snapshot: LibrarySnapshot) -> Self {
        let order = snapshot.games.iter().map(|g| g.name.clone()).collect();
        let games = snapshot
            .games
            .into_iter()
            .map(|g| (g.name.clone(), g))
            .collect();
        Self {
            order,
            games,
            history: snapshot.history,
            last_promotions: snapshot.last_promotions,
        }
    }

    /// Tracked game names in library order.
    pub fn game_names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn game(&self, name: &str) -> Option<&TrackedGame> {
        self.games.get(name)
    }

    /// Record one scrape outcome: set the current price, lower the
    /// historical low when beaten, and log numeric prices to the history.
    /// `None` (not found) clears the current price but never touches the
    /// low or the history.
    pub fn record_observation(
        &mut self,
        name: &str,
        platform: Platform,
        price: Option<i64>,
        date: NaiveDate,
    ) {
        if !self.games.contains_key(name) {
            self.order.push(name.to_string());
            self.games.insert(name.to_string(), TrackedGame::new(name));
        }
        let Some(game) = self.games.get_mut(name) else { return };

        let state = game.platforms.entry(platform).or_default();
        state.current = price;
        game.last_updated = Some(date);

        let Some(value) = price else { return };

        if state.historical_low.map_or(true, |low| value < low) {
            info!(game = %name, %platform, price = value, "new historical low");
            state.historical_low = Some(value);
        }

        let existing = self
            .history
            .iter_mut()
            .find(|r| r.game == name && r.platform == platform && r.date == date);
        match existing {
            Some(record) => record.price = value,
            None => self.history.push(PriceHistoryRecord {
                game: name.to_string(),
                platform,
                date,
                price: value,
            }),
        }
    }

    /// All of a game's records across platforms, oldest first.
    pub fn history_for(&self, name: &str) -> Vec<PriceHistoryRecord> {
        let mut records: Vec<PriceHistoryRecord> = self
            .history
            .iter()
            .filter(|r| r.game == name)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.date);
        records
    }

    pub fn last_promotion(&self, name: &str) -> Option<NaiveDate> {
        self.last_promotions.get(name).copied()
    }

    pub fn mark_promotion(&mut self, name: &str, date: NaiveDate) {
        self.last_promotions.insert(name.to_string(), date);
    }

    /// Assemble one game's committable state.
    pub fn game_update(&self, name: &str) -> Option<GameUpdate> {
        Some(GameUpdate {
            game: self.games.get(name)?.clone(),
            history: self.history_for(name),
            last_promotion: self.last_promotion(name),
        })
    }
}

/// JSON-file-backed repository: the whole library lives in one file that is
/// rewritten on every game commit.
pub struct JsonFileRepository {
    path: PathBuf,
    snapshot: LibrarySnapshot,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: LibrarySnapshot::default(),
        }
    }
}

impl PriceRepository for JsonFileRepository {
    fn load(&mut self) -> Result<LibrarySnapshot, StoreError> {
        if !self.path.exists() {
            return Ok(LibrarySnapshot::default());
        }
        let text = fs::read_to_string(&self.path)?;
        self.snapshot = serde_json::from_str(&text)?;
        Ok(self.snapshot.clone())
    }

    fn commit_game(&mut self, update: &GameUpdate) -> Result<(), StoreError> {
        match self
            .snapshot
            .games
            .iter_mut()
            .find(|g| g.name == update.game.name)
        {
            Some(existing) => *existing = update.game.clone(),
            None => self.snapshot.games.push(update.game.clone()),
        }
        self.snapshot.history.retain(|r| r.game != update.game.name);
        self.snapshot.history.extend(update.history.iter().cloned());
        if let Some(date) = update.last_promotion {
            self.snapshot
                .last_promotions
                .insert(update.game.name.clone(), date);
        }

        let text = serde_json::to_string_pretty(&self.snapshot)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
