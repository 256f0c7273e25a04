//! Bounded cache with per-entry expiry.
//!
//! Every cache in this crate is a [`BoundedTtlCache`]: an LRU map guarded by a
//! mutex, where each entry remembers when it was inserted and reads as absent
//! once its age reaches the cache TTL.

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use accessgrants_core::{AccessGrantsError, AccessGrantsResult};
use accessgrants_telemetry::metrics::{record_cache_eviction, record_cache_lookup, LookupResult};
use lru::LruCache;
use parking_lot::Mutex;

use crate::config::CacheConfig;

/// Cached value with its insertion time.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= ttl
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found a live entry.
    pub hits: u64,
    /// Lookups that found nothing (expired entries included).
    pub misses: u64,
    /// Entries dropped on read because they outlived the TTL.
    pub expirations: u64,
    /// Entries evicted because the cache was full.
    pub evictions: u64,
    /// Entries currently stored, possibly including expired ones not yet read.
    pub size: usize,
}

impl CacheStats {
    /// Share of lookups that were hits.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe, capacity-bounded key-value store with a fixed TTL.
pub struct BoundedTtlCache<K, V> {
    name: &'static str,
    ttl: Duration,
    capacity: NonZeroUsize,
    entries: Mutex<LruCache<K, CacheEntry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    evictions: AtomicU64,
}

impl<K: Hash + Eq, V: Clone> BoundedTtlCache<K, V> {
    /// Create a cache after checking `config` against `max_ttl`.
    ///
    /// `name` labels the cache in logs and metrics.
    pub fn new(
        name: &'static str,
        config: CacheConfig,
        max_ttl: Duration,
    ) -> AccessGrantsResult<Self> {
        config.validate(max_ttl)?;
        let capacity = NonZeroUsize::new(config.max_entries).ok_or_else(|| {
            AccessGrantsError::invalid_configuration("cache size must be greater than 0")
        })?;

        Ok(Self {
            name,
            ttl: config.ttl,
            capacity,
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        })
    }

    /// Get a live value, marking it as recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let lookup = entries.get(key).map(|entry| {
            if entry.is_expired(self.ttl, now) {
                None
            } else {
                Some(entry.value.clone())
            }
        });

        match lookup {
            Some(Some(value)) => {
                drop(entries);
                self.hits.fetch_add(1, Ordering::Relaxed);
                record_cache_lookup(self.name, LookupResult::Hit);
                Some(value)
            }
            Some(None) => {
                entries.pop(key);
                drop(entries);
                self.expirations.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                record_cache_lookup(self.name, LookupResult::Expired);
                None
            }
            None => {
                drop(entries);
                self.misses.fetch_add(1, Ordering::Relaxed);
                record_cache_lookup(self.name, LookupResult::Miss);
                None
            }
        }
    }

    /// Insert or replace a value, evicting the least recently used entry when full.
    pub fn insert(&self, key: K, value: V) {
        let entry = CacheEntry::new(value);

        let evicted = {
            let mut entries = self.entries.lock();
            let replacing = entries.contains(&key);
            let displaced = entries.push(key, entry);
            !replacing && displaced.is_some()
        };

        if evicted {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            record_cache_eviction(self.name);
        }
    }

    /// Remove an entry, returning its value if it was still live.
    pub fn remove(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        self.entries
            .lock()
            .pop(key)
            .filter(|entry| !entry.is_expired(self.ttl, now))
            .map(|entry| entry.value)
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache stores nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name used in logs and metrics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Entry time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: self.len(),
        }
    }
}

impl<K, V> fmt::Debug for BoundedTtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedTtlCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_RESOLVER_TTL;
    use std::sync::Arc;
    use std::thread;

    fn cache(max_entries: usize, ttl: Duration) -> BoundedTtlCache<String, u32> {
        BoundedTtlCache::new("test", CacheConfig::new(max_entries, ttl), MAX_RESOLVER_TTL).unwrap()
    }

    #[test]
    fn test_cache_hit_miss() {
        let cache = cache(10, Duration::from_secs(60));

        assert!(cache.get(&"a".to_string()).is_none());

        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_insert_replaces() {
        let cache = cache(10, Duration::from_secs(60));
        cache.insert("a".to_string(), 1);
        cache.insert("a".to_string(), 2);
        assert_eq!(cache.get(&"a".to_string()), Some(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_entries_expire() {
        let cache = cache(10, Duration::from_millis(50));
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));

        thread::sleep(Duration::from_millis(80));

        assert!(cache.get(&"a".to_string()).is_none());
        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn test_capacity_bound_evicts_least_recently_used() {
        let cache = cache(2, Duration::from_secs(60));
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        // Touch "a" so "b" becomes the eviction candidate.
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        cache.insert("c".to_string(), 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert!(cache.get(&"b".to_string()).is_none());
        assert_eq!(cache.get(&"c".to_string()), Some(3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = cache(10, Duration::from_secs(60));
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        assert_eq!(cache.remove(&"a".to_string()), Some(1));
        assert!(cache.get(&"a".to_string()).is_none());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalid_configuration() {
        let result: AccessGrantsResult<BoundedTtlCache<String, u32>> = BoundedTtlCache::new(
            "test",
            CacheConfig::new(1_000_001, Duration::from_secs(1)),
            MAX_RESOLVER_TTL,
        );
        assert!(matches!(
            result,
            Err(AccessGrantsError::InvalidConfiguration(_))
        ));

        let result: AccessGrantsResult<BoundedTtlCache<String, u32>> = BoundedTtlCache::new(
            "test",
            CacheConfig::new(10, Duration::from_secs(61)),
            Duration::from_secs(60),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_concurrent_access_respects_capacity() {
        let cache = Arc::new(cache(64, Duration::from_secs(60)));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..500u32 {
                        let key = format!("{worker}-{i}");
                        cache.insert(key.clone(), i);
                        let _ = cache.get(&key);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 64);
        assert_eq!(cache.stats().evictions, 8 * 500 - 64);
    }
}
