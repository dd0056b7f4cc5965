//! Time-bounded result cache keyed by postal code.
//!
//! Entries live in the session store under `gemini-cache-<postalCode>` as
//! `{"timestamp": <epoch millis>, "data": [...]}`. An entry is valid while
//! `now - timestamp < CACHE_EXPIRATION`; reading an invalid entry evicts it.

use crate::domain::model::Listing;
use crate::domain::ports::{Clock, SessionStore, SystemClock};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CACHE_EXPIRATION: Duration = Duration::from_secs(10 * 60);
pub const CACHE_KEY_PREFIX: &str = "gemini-cache-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub timestamp: i64,
    pub data: Vec<Listing>,
}

pub struct ResultCache<S: SessionStore, K: Clock = SystemClock> {
    store: S,
    clock: K,
}

impl<S: SessionStore> ResultCache<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: SessionStore, K: Clock> ResultCache<S, K> {
    pub fn with_clock(store: S, clock: K) -> Self {
        Self { store, clock }
    }

    pub fn storage_key(key: &str) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, key)
    }

    fn expiration_millis() -> i64 {
        CACHE_EXPIRATION.as_millis() as i64
    }

    /// Returns the entry for `key` if it is still inside the expiration window.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let storage_key = Self::storage_key(key);
        let raw = self.store.get_item(&storage_key)?;

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Discarding unreadable cache entry for {}: {}", key, e);
                self.evict(&storage_key, &raw);
                return None;
            }
        };

        let age = self.clock.now_millis() - entry.timestamp;
        if age < Self::expiration_millis() {
            tracing::debug!("Cache hit for {} (age {} ms)", key, age);
            Some(entry)
        } else {
            if self.evict(&storage_key, &raw) {
                tracing::info!("Removed expired cache for ZIP code: {}", key);
            }
            None
        }
    }

    /// Stores `listings` under `key` stamped with the current time,
    /// replacing any earlier entry wholesale.
    pub fn put(&self, key: &str, listings: &[Listing]) -> Result<()> {
        let entry = CacheEntry {
            timestamp: self.clock.now_millis(),
            data: listings.to_vec(),
        };
        let raw = serde_json::to_string(&entry)?;
        self.store.set_item(&Self::storage_key(key), &raw)
    }

    pub fn invalidate(&self, key: &str) -> Result<()> {
        self.store.remove_item(&Self::storage_key(key))
    }

    /// Removes the entry only if it is still the one that was read, so a
    /// concurrent `put` for the same key survives.
    fn evict(&self, storage_key: &str, read: &str) -> bool {
        match self.store.remove_if(storage_key, read) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!("Failed to evict cache entry {}: {}", storage_key, e);
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    /// Clock that only moves when told to.
    #[derive(Clone, Default)]
    pub(crate) struct ManualClock {
        now: Arc<AtomicI64>,
    }

    impl ManualClock {
        pub(crate) fn at(millis: i64) -> Self {
            Self {
                now: Arc::new(AtomicI64::new(millis)),
            }
        }

        pub(crate) fn advance(&self, duration: Duration) {
            self.now
                .fetch_add(duration.as_millis() as i64, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }
    }

    /// Store that lands a fresh write right after the first read of a key.
    struct InterleavedStore {
        inner: MemoryStore,
        pending: parking_lot::Mutex<Option<(String, String)>>,
    }

    impl SessionStore for InterleavedStore {
        fn get_item(&self, key: &str) -> Option<String> {
            let value = self.inner.get_item(key);
            if let Some((k, v)) = self.pending.lock().take() {
                self.inner.set_item(&k, &v).unwrap();
            }
            value
        }

        fn set_item(&self, key: &str, value: &str) -> Result<()> {
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<()> {
            self.inner.remove_item(key)
        }

        fn remove_if(&self, key: &str, expected: &str) -> Result<bool> {
            self.inner.remove_if(key, expected)
        }
    }

    fn listings() -> Vec<Listing> {
        vec![Listing {
            id: "a".into(),
            investment_score: 90,
            is_active: true,
            ..Listing::default()
        }]
    }

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn test_put_then_get_returns_entry_with_capture_time() {
        let store = MemoryStore::new();
        let cache = ResultCache::with_clock(store.clone(), ManualClock::at(T0));

        cache.put("90210", &listings()).unwrap();
        let entry = cache.get("90210").unwrap();

        assert_eq!(entry.timestamp, T0);
        assert_eq!(entry.data, listings());
        assert!(store.get_item("gemini-cache-90210").is_some());
    }

    #[test]
    fn test_entry_just_inside_window_is_a_hit() {
        let clock = ManualClock::at(T0);
        let cache = ResultCache::with_clock(MemoryStore::new(), clock.clone());
        cache.put("90210", &listings()).unwrap();

        clock.advance(CACHE_EXPIRATION - Duration::from_millis(1));
        assert!(cache.get("90210").is_some());
    }

    #[test]
    fn test_entry_at_boundary_is_expired_and_evicted() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(T0);
        let cache = ResultCache::with_clock(store.clone(), clock.clone());
        cache.put("90210", &listings()).unwrap();

        clock.advance(CACHE_EXPIRATION);
        assert!(cache.get("90210").is_none());
        assert!(store.get_item("gemini-cache-90210").is_none());
    }

    #[test]
    fn test_entry_past_boundary_is_evicted() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(T0);
        let cache = ResultCache::with_clock(store.clone(), clock.clone());
        cache.put("90210", &listings()).unwrap();

        clock.advance(CACHE_EXPIRATION + Duration::from_millis(1));
        assert!(cache.get("90210").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_overwrites_and_restamps() {
        let clock = ManualClock::at(T0);
        let cache = ResultCache::with_clock(MemoryStore::new(), clock.clone());
        cache.put("90210", &listings()).unwrap();

        clock.advance(Duration::from_secs(300));
        cache.put("90210", &[]).unwrap();

        let entry = cache.get("90210").unwrap();
        assert_eq!(entry.timestamp, T0 + 300_000);
        assert!(entry.data.is_empty());
    }

    #[test]
    fn test_invalidate_removes_unconditionally() {
        let cache = ResultCache::with_clock(MemoryStore::new(), ManualClock::at(T0));
        cache.put("90210", &listings()).unwrap();
        cache.invalidate("90210").unwrap();
        assert!(cache.get("90210").is_none());
    }

    #[test]
    fn test_keys_are_not_normalized() {
        let cache = ResultCache::with_clock(MemoryStore::new(), ManualClock::at(T0));
        cache.put("02134", &listings()).unwrap();
        assert!(cache.get("2134").is_none());
        assert!(cache.get("02134").is_some());
    }

    #[test]
    fn test_corrupt_entry_is_a_miss_and_evicted() {
        let store = MemoryStore::new();
        store.set_item("gemini-cache-90210", "{not json").unwrap();

        let cache = ResultCache::with_clock(store.clone(), ManualClock::at(T0));
        assert!(cache.get("90210").is_none());
        assert!(store.get_item("gemini-cache-90210").is_none());
    }

    #[test]
    fn test_expired_read_keeps_concurrent_fresh_put() {
        let inner = MemoryStore::new();
        let clock = ManualClock::at(T0);
        let stale_writer = ResultCache::with_clock(inner.clone(), clock.clone());
        stale_writer.put("90210", &listings()).unwrap();
        clock.advance(CACHE_EXPIRATION);

        let fresh = serde_json::to_string(&CacheEntry {
            timestamp: clock.now_millis(),
            data: listings(),
        })
        .unwrap();
        let store = InterleavedStore {
            inner: inner.clone(),
            pending: parking_lot::Mutex::new(Some(("gemini-cache-90210".into(), fresh.clone()))),
        };
        let cache = ResultCache::with_clock(store, clock.clone());

        assert!(cache.get("90210").is_none());
        assert_eq!(inner.get_item("gemini-cache-90210"), Some(fresh));
        assert!(cache.get("90210").is_some());
    }
}
