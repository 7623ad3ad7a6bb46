use crate::config::RuntimeConfig;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Concurrent cache with a time-to-live and an entry cap. When full, the
/// oldest entry is evicted.
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
    max_entries: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entry = self.entries.get(key)?;
            if entry.inserted_at.elapsed() <= self.ttl {
                return Some(entry.value.clone());
            }
        }
        // read guard must be released before removing
        self.entries.remove(key);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.purge_expired();
            if self.entries.len() >= self.max_entries {
                self.evict_oldest();
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Returns the cached value or computes, stores and returns a new one.
    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(v) = self.get(&key) {
            return v;
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, e| e.inserted_at.elapsed() <= ttl);
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.value().inserted_at)
            .map(|e| e.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

pub type HourlySeriesMap = Arc<BTreeMap<(NaiveDate, u32), f64>>;

/// Derived per-role data shared between stages of one run.
#[derive(Debug)]
pub struct RunCache {
    hourly: TtlCache<String, HourlySeriesMap>,
}

impl RunCache {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            hourly: TtlCache::new(
                Duration::from_secs(config.cache_ttl_secs),
                config.cache_max_entries,
            ),
        }
    }

    /// Hourly staff-hours of `role`, computed once per run.
    pub fn hourly_series(
        &self,
        role: &str,
        compute: impl FnOnce() -> BTreeMap<(NaiveDate, u32), f64>,
    ) -> HourlySeriesMap {
        self.hourly.get_or_insert_with(role.to_string(), || {
            debug!(role = %role, "Caching hourly series");
            Arc::new(compute())
        })
    }

    pub fn len(&self) -> usize {
        self.hourly.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hourly.is_empty()
    }
}
