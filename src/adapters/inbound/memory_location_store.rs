use crate::common::DomainResult;
use crate::domains::tracking::{LocationSample, LocationStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory location store for testing and development. Samples arrive in
/// ingest order, which for a single writer is ascending `recorded_at`.
#[derive(Debug, Default)]
pub struct InMemoryLocationStore {
    samples: RwLock<HashMap<i64, Vec<LocationSample>>>,
}

impl InMemoryLocationStore {
    pub fn new() -> Self {
        Self {
            samples: RwLock::new(HashMap::new()),
        }
    }

    pub async fn sample_count(&self, agent_id: i64) -> usize {
        self.samples
            .read()
            .await
            .get(&agent_id)
            .map(|history| history.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl LocationStore for InMemoryLocationStore {
    async fn append(&self, sample: LocationSample) -> DomainResult<()> {
        let mut samples = self.samples.write().await;
        samples
            .entry(sample.agent_id)
            .or_insert_with(Vec::new)
            .push(sample);
        Ok(())
    }

    async fn latest(&self, agent_id: i64) -> DomainResult<Option<LocationSample>> {
        let samples = self.samples.read().await;
        Ok(samples
            .get(&agent_id)
            .and_then(|history| history.last())
            .cloned())
    }

    async fn history_since(
        &self,
        agent_id: i64,
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<LocationSample>> {
        let samples = self.samples.read().await;
        Ok(samples
            .get(&agent_id)
            .map(|history| {
                history
                    .iter()
                    .filter(|sample| sample.recorded_at >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
