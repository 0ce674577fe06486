use super::sample::LocationSample;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CacheEntry {
    sample: LocationSample,
    cached_at: Instant,
}

/// TTL-bounded cache of each agent's latest sample.
///
/// `get` only returns fresh entries; an expired entry is dropped on the next
/// access. Staleness never blocks a read, it just forces the caller back to
/// the durable store (the read-through composition lives in the tracking
/// service).
#[derive(Debug)]
pub struct LocationCache {
    ttl: Duration,
    entries: RwLock<HashMap<i64, CacheEntry>>,
}

impl LocationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, agent_id: i64) -> Option<LocationSample> {
        {
            let entries = self.entries.read().await;
            match entries.get(&agent_id) {
                Some(entry) if entry.cached_at.elapsed() <= self.ttl => {
                    return Some(entry.sample.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Entry exists but expired; drop it lazily.
        self.entries.write().await.remove(&agent_id);
        None
    }

    /// Unconditional overwrite with TTL reset.
    pub async fn put(&self, sample: LocationSample) {
        let mut entries = self.entries.write().await;
        entries.insert(
            sample.agent_id,
            CacheEntry {
                sample,
                cached_at: Instant::now(),
            },
        );
    }

    pub async fn evict(&self, agent_id: i64) {
        self.entries.write().await.remove(&agent_id);
    }
}
