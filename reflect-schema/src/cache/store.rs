//! Cache store implementation

use std::any::TypeId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lru::LruCache;

use crate::schema::Schema;

/// Identity of a cached schema: the root type plus the configuration fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub type_id: TypeId,
    pub fingerprint: u64,
}

/// Concurrent schema cache with least-recently-used eviction
///
/// Entries live in a sharded map; recency order is tracked separately behind
/// a mutex that is only held to splice the order list. Lookups return deep
/// clones so callers never share nodes with the cache.
pub struct SchemaCache {
    entries: DashMap<CacheKey, Schema>,
    order: Mutex<LruCache<CacheKey, ()>>,
    counters: Counters,
}

/// Lookup and store outcomes since the last clear
#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    /// Stores dropped because another caller stored the key first
    rejected_stores: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self, total_entries: usize) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;

        CacheStats {
            total_entries,
            hits,
            misses,
            hit_ratio: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
            evictions: self.evictions.load(Ordering::Relaxed),
            rejected_stores: self.rejected_stores.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.evictions,
            &self.rejected_stores,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl SchemaCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(LruCache::unbounded()),
            counters: Counters::default(),
        }
    }

    /// Clone of the cached schema, promoting it to most recently used
    pub fn get(&self, key: &CacheKey) -> Option<Schema> {
        let Some(schema) = self.entries.get(key).map(|entry| entry.value().clone()) else {
            tracing::debug!("cache miss");
            Counters::bump(&self.counters.misses);
            return None;
        };

        self.lock_order().promote(key);
        tracing::debug!("cache hit");
        Counters::bump(&self.counters.hits);
        Some(schema)
    }

    /// Store a clone of `schema` unless the key is already present
    ///
    /// With a positive `max_entries`, least recently used entries are evicted
    /// until the cache is back within bound.
    pub fn insert(&self, key: CacheKey, schema: &Schema, max_entries: usize) {
        match self.entries.entry(key) {
            Entry::Occupied(_) => {
                Counters::bump(&self.counters.rejected_stores);
                tracing::trace!("cache entry already present, store rejected");
                return;
            }
            Entry::Vacant(vacant) => {
                vacant.insert(schema.clone());
            }
        }

        let mut order = self.lock_order();
        order.push(key, ());
        tracing::trace!(entries = order.len(), "cache entry stored");

        if max_entries == 0 {
            return;
        }
        while order.len() > max_entries {
            let Some((evicted, ())) = order.pop_lru() else {
                break;
            };
            self.entries.remove(&evicted);
            Counters::bump(&self.counters.evictions);
            tracing::debug!("LRU eviction occurred");
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and reset the counters
    pub fn clear(&self) {
        let mut order = self.lock_order();
        order.clear();
        self.entries.clear();
        self.counters.reset();
        tracing::debug!("cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.entries.len())
    }

    fn lock_order(&self) -> MutexGuard<'_, LruCache<CacheKey, ()>> {
        self.order.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCache")
            .field("entries", &self.entries.len())
            .field("counters", &self.counters)
            .finish()
    }
}

/// Snapshot of the schema cache
///
/// Counters cover the period since the cache was created or last cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    /// Schemas currently held
    pub total_entries: usize,
    /// Top-level calls answered from the cache
    pub hits: u64,
    /// Top-level calls that had to generate
    pub misses: u64,
    /// `hits / (hits + misses)`, or 0 before the first lookup
    pub hit_ratio: f64,
    /// Schemas dropped to stay within `max_cache_entries`
    pub evictions: u64,
    /// Generated schemas discarded because a concurrent call stored first
    pub rejected_stores: u64,
}
