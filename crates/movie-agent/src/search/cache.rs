//! TTL cache for search results.
//!
//! Expired entries are evicted lazily on lookup; there is no size bound.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// One cached result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub query: String,
    pub text: String,
    pub inserted_at: Instant,
}

/// Query text → result text, valid for `ttl` after insertion. A zero TTL disables caching.
#[derive(Debug)]
pub struct TtlCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Returns the cached text when the entry is younger than the TTL; removes it otherwise.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.inserted_at.elapsed() < self.ttl {
            return Some(entry.text.clone());
        }
        self.entries.remove(key);
        None
    }

    /// Stores `text` under `key`, replacing any older entry.
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        if self.ttl.is_zero() {
            return;
        }
        let query = key.into();
        self.entries.insert(
            query.clone(),
            CacheEntry {
                query,
                text: text.into(),
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn hit_within_ttl_then_lazy_eviction() {
        let mut cache = TtlCache::new(Duration::from_secs(10));
        cache.insert("inception cast", "- Leonardo DiCaprio");
        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(cache.get("inception cast").as_deref(), Some("- Leonardo DiCaprio"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.len(), 1);
        assert!(cache.get("inception cast").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn insert_overwrites_stale_entry() {
        let mut cache = TtlCache::new(Duration::from_secs(5));
        cache.insert("k", "old");
        tokio::time::advance(Duration::from_secs(4)).await;
        cache.insert("k", "new");
        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn zero_ttl_never_stores() {
        let mut cache = TtlCache::new(Duration::ZERO);
        cache.insert("k", "v");
        assert!(cache.is_empty());
        assert!(cache.get("k").is_none());
    }

    #[tokio::test]
    async fn clear_empties_cache() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", "1");
        cache.insert("b", "2");
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
