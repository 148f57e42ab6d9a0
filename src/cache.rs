//! TTL cache with an injectable clock
//!
//! Replacement for process-global cache maps: the cache is an explicit
//! value owned by whoever needs it, and time comes in as an argument so
//! tests control expiry.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};

/// Source of "now" for everything time-dependent in the engine.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Map whose entries expire `ttl` after insertion.
pub struct TtlCache<K, V> {
    entries: HashMap<K, (V, DateTime<Utc>)>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: HashMap::new(),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Value for `key` if it was inserted less than the TTL before `now`.
    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        self.entries
            .get(key)
            .filter(|(_, inserted_at)| now - *inserted_at < self.ttl)
            .map(|(value, _)| value.clone())
    }

    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) {
        self.entries.insert(key, (value, now));
    }

    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
    }
}
