//! Recommendation result cache
//!
//! Explicit cache service injected into the recommendation engine. Entries
//! are keyed by a deterministic hash of (plant id, generation options) and
//! expire lazily on read after the TTL; there is no background sweep.
//!
//! Thread-safe via `std::sync::Mutex`; the lock is held only for hash-map
//! operations and never across await points.

use chrono::{DateTime, Duration, Utc};
use cultiva_common::time;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::RecommendationSet;

struct CacheEntry {
    set: RecommendationSet,
    inserted_at: DateTime<Utc>,
    plant_id: Uuid,
}

/// TTL-bounded cache of recommendation sets
pub struct RecommendationCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl RecommendationCache {
    /// Default time-to-live for cached sets
    pub const DEFAULT_TTL_MINUTES: i64 = 60;

    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a cached set. An entry older than the TTL is removed and
    /// treated as absent.
    pub fn get(&self, key: &str) -> Option<RecommendationSet> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(entry) if time::now() - entry.inserted_at <= self.ttl => Some(entry.set.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a set under its key, stamped with the current time
    pub fn insert(&self, key: String, plant_id: Uuid, set: RecommendationSet) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(
            key,
            CacheEntry {
                set,
                inserted_at: time::now(),
                plant_id,
            },
        );
    }

    /// Remove every entry belonging to a plant. Returns how many entries
    /// were removed.
    pub fn clear_plant(&self, plant_id: Uuid) -> usize {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        let before = entries.len();
        entries.retain(|_, entry| entry.plant_id != plant_id);
        before - entries.len()
    }

    /// Number of live entries (expired-but-unread entries included)
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RecommendationCache {
    fn default() -> Self {
        Self::new(Duration::minutes(Self::DEFAULT_TTL_MINUTES))
    }
}
