use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;

use crate::HealthScoreResult;

pub const DEFAULT_CACHE_TTL_SECS: i64 = 300;

struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// TTL cache of composite results. Expired entries read as misses.
pub struct ScoreCache {
    entries: DashMap<String, CacheEntry<HealthScoreResult>>,
    ttl_secs: i64,
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL_SECS)
    }
}

impl ScoreCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_secs,
        }
    }

    pub fn key_for(as_of: NaiveDate) -> String {
        format!("health:{}", as_of)
    }

    pub fn get(&self, key: &str) -> Option<HealthScoreResult> {
        let entry = self.entries.get(key)?;
        let age = (Utc::now() - entry.cached_at).num_seconds();
        if age < self.ttl_secs {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    pub fn set(&self, key: String, result: HealthScoreResult) {
        self.entries.insert(
            key,
            CacheEntry {
                data: result,
                cached_at: Utc::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
