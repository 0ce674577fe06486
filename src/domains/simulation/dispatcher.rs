use super::ports::IngestionClient;
use crate::common::DomainError;
use crate::domains::tracking::LocationUpdate;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Groups a tick's updates into fixed-size batches and transmits them without
/// blocking the tick loop.
///
/// Failure policy: a failed batch transmission is decomposed into one
/// independent send per record, in original batch order, each attempted
/// exactly once. Individual outcomes are logged and never retried further;
/// telemetry loss is accepted, the simulator is a load generator, not a
/// system of record.
#[derive(Clone)]
pub struct BatchDispatcher {
    client: Arc<dyn IngestionClient>,
    batch_size: usize,
}

impl BatchDispatcher {
    pub fn new(client: Arc<dyn IngestionClient>, batch_size: usize) -> Self {
        Self { client, batch_size }
    }

    /// Fire-and-forget: every batch is spawned onto the runtime, the caller
    /// never waits on network completion. No ordering across batches.
    pub fn dispatch_tick(&self, updates: Vec<LocationUpdate>) {
        for chunk in updates.chunks(self.batch_size) {
            let client = Arc::clone(&self.client);
            let batch = chunk.to_vec();
            tokio::spawn(async move {
                Self::transmit(client, batch).await;
            });
        }
    }

    async fn transmit(client: Arc<dyn IngestionClient>, batch: Vec<LocationUpdate>) {
        match client.submit_batch(&batch).await {
            Ok(()) => {
                debug!("Sent batch of {} location updates", batch.len());
            }
            Err(DomainError::Transmission(reason)) if batch.len() > 1 => {
                warn!(
                    "Batch of {} failed ({}), retrying each record individually",
                    batch.len(),
                    reason
                );
                for update in &batch {
                    match client.submit_single(update).await {
                        Ok(()) => {
                            debug!("Sent individual update for agent {}", update.agent_id);
                        }
                        Err(err) => {
                            error!(
                                "Dropping location update for agent {}: {}",
                                update.agent_id, err
                            );
                        }
                    }
                }
            }
            Err(err) => {
                error!("Dropping batch of {}: {}", batch.len(), err);
            }
        }
    }
}
