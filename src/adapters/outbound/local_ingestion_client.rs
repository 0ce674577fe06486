use crate::application::TrackingService;
use crate::common::{DomainError, DomainResult};
use crate::domains::simulation::IngestionClient;
use crate::domains::tracking::LocationUpdate;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Hands simulator output straight to an in-process tracking service,
/// bypassing the network. Used when the pipeline runs as a single binary.
pub struct LocalIngestionClient {
    service: Arc<TrackingService>,
}

impl LocalIngestionClient {
    pub fn new(service: Arc<TrackingService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl IngestionClient for LocalIngestionClient {
    async fn submit_batch(&self, updates: &[LocationUpdate]) -> DomainResult<()> {
        let outcomes = self.service.ingest_batch(updates.to_vec()).await;
        let rejected = outcomes.iter().filter(|outcome| !outcome.accepted).count();
        if rejected > 0 {
            debug!("{} of {} batch items rejected", rejected, outcomes.len());
        }
        Ok(())
    }

    async fn submit_single(&self, update: &LocationUpdate) -> DomainResult<()> {
        self.service
            .ingest(update.clone())
            .await
            .map(|_| ())
            .map_err(|e| DomainError::Transmission(e.to_string()))
    }
}
