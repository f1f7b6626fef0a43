//! # Placement Cache
//!
//! Remembers which host last served an actor of a sticky type. Entries are keyed by a
//! truncated SHA-256 digest of the actor type and id rather than by the full strings, and
//! point into a deduplicated table of host names.
//!
//! A digest collision can return the host of a different actor. That is tolerated: the
//! invoker only trusts the cache on its first attempt and re-resolves when it fails.

use crate::config::PlacementCacheConfig;
use crate::names::{ActorId, ActorType};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Fixed-size digest of an actor identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacementKey([u8; 8]);

#[derive(Default)]
struct Tables {
    host_index: HashMap<String, u32>,
    hosts: Vec<String>,
    entries: HashMap<PlacementKey, u32>,
}

/// Bounded, concurrent map from actor identity to last known host.
pub struct PlacementCache {
    tables: RwLock<Tables>,
    capacity: usize,
    capacity_low: usize,
}

impl Default for PlacementCache {
    fn default() -> Self {
        Self::new(&PlacementCacheConfig::default())
    }
}

impl PlacementCache {
    pub fn new(config: &PlacementCacheConfig) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            capacity: config.capacity.max(1),
            capacity_low: config.capacity_low.min(config.capacity),
        }
    }

    /// Computes the cache key. Takes no lock.
    pub fn prepare(&self, actor_type: &ActorType, actor_id: &ActorId) -> PlacementKey {
        let mut hasher = Sha256::new();
        hasher.update((actor_type.as_str().len() as u64).to_le_bytes());
        hasher.update(actor_type.as_str().as_bytes());
        for segment in actor_id.segments() {
            hasher.update((segment.len() as u64).to_le_bytes());
            hasher.update(segment.as_bytes());
        }
        let digest = hasher.finalize();
        let mut key = [0u8; 8];
        key.copy_from_slice(&digest[..8]);
        PlacementKey(key)
    }

    pub fn get(&self, key: &PlacementKey) -> Option<String> {
        let tables = self.tables.read();
        let index = *tables.entries.get(key)?;
        tables.hosts.get(index as usize).cloned()
    }

    pub fn update(&self, actor_type: &ActorType, actor_id: &ActorId, host: &str) {
        let key = self.prepare(actor_type, actor_id);
        let mut guard = self.tables.write();
        let tables = &mut *guard;
        let index = match tables.host_index.get(host) {
            Some(index) => *index,
            None => {
                let index = tables.hosts.len() as u32;
                tables.hosts.push(host.to_string());
                tables.host_index.insert(host.to_string(), index);
                index
            }
        };
        tables.entries.insert(key, index);

        if tables.entries.len() > self.capacity {
            let excess = tables.entries.len() - self.capacity_low;
            // Any entry may go, including the one just inserted.
            let victims: Vec<PlacementKey> = tables.entries.keys().take(excess).copied().collect();
            for victim in &victims {
                tables.entries.remove(victim);
            }
            tracing::debug!(evicted = victims.len(), "Placement cache trimmed");
        }
    }

    pub fn delete(&self, key: &PlacementKey) {
        self.tables.write().entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.tables.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of interned host names. Never shrinks.
    pub fn host_count(&self) -> usize {
        self.tables.read().hosts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn echo() -> ActorType {
        ActorType::new("Echo")
    }

    #[test]
    fn test_update_get_delete() {
        let cache = PlacementCache::default();
        let id = ActorId::new(["42"]);
        let key = cache.prepare(&echo(), &id);
        assert_eq!(cache.get(&key), None);

        cache.update(&echo(), &id, "host-a");
        assert_eq!(cache.get(&key), Some("host-a".to_string()));

        cache.update(&echo(), &id, "host-b");
        assert_eq!(cache.get(&key), Some("host-b".to_string()));

        cache.delete(&key);
        assert_eq!(cache.get(&key), None);
        assert_eq!(cache.host_count(), 2);
    }

    #[test]
    fn test_key_depends_on_segment_boundaries() {
        let cache = PlacementCache::default();
        let a = cache.prepare(&echo(), &ActorId::new(["ab", "c"]));
        let b = cache.prepare(&echo(), &ActorId::new(["a", "bc"]));
        assert_ne!(a, b);
        assert_eq!(a, cache.prepare(&echo(), &ActorId::new(["ab", "c"])));
    }

    #[test]
    fn test_eviction_down_to_low_water_mark() {
        let cache = PlacementCache::new(&PlacementCacheConfig {
            capacity: 10,
            capacity_low: 6,
        });
        for i in 0..10 {
            cache.update(&echo(), &ActorId::new([i.to_string()]), "host-a");
        }
        assert_eq!(cache.len(), 10);

        cache.update(&echo(), &ActorId::new(["overflow"]), "host-b");
        assert_eq!(cache.len(), 6);
        assert_eq!(cache.host_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_use_stays_bounded() {
        let cache = Arc::new(PlacementCache::new(&PlacementCacheConfig {
            capacity: 50,
            capacity_low: 40,
        }));

        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    let host = format!("host-{}", worker % 3);
                    for i in 0..500 {
                        let id = ActorId::new([worker.to_string(), i.to_string()]);
                        cache.update(&echo(), &id, &host);
                        assert!(cache.len() <= 50);
                        let key = cache.prepare(&echo(), &id);
                        if let Some(found) = cache.get(&key) {
                            assert!(found.starts_with("host-"));
                        }
                        if i % 7 == 0 {
                            cache.delete(&key);
                            assert_eq!(cache.get(&key), None);
                        }
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.await.unwrap();
        }

        assert!(cache.len() <= 50);
        assert_eq!(cache.host_count(), 3);
    }
}
