use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Shared in-memory TTL cache. Clones share the same storage, so a clone
/// handed to a spawned task fills the cache the UI reads from.
pub struct Cache<K, V> {
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
    ttl: Duration,
    enable_metrics: bool,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_metrics(ttl, false)
    }

    /// Same as `new`, but emits `tracing::debug!` hit/miss events.
    pub fn with_metrics(ttl: Duration, enable_metrics: bool) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            enable_metrics,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().ok()?;
        let hit = entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone());

        if self.enable_metrics {
            tracing::debug!(hit = hit.is_some(), entries = entries.len(), "cache.get");
        }
        hit
    }

    pub fn set(&self, key: K, value: V) {
        match self.entries.write() {
            Ok(mut entries) => {
                // Drop stale entries while we hold the lock anyway.
                let ttl = self.ttl;
                entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
                entries.insert(
                    key,
                    Entry {
                        value,
                        stored_at: Instant::now(),
                    },
                );
            }
            Err(_) => {
                tracing::warn!("cache lock poisoned; value not stored");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            ttl: self.ttl,
            enable_metrics: self.enable_metrics,
        }
    }
}
