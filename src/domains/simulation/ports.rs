use crate::common::DomainResult;
use crate::domains::tracking::LocationUpdate;
use async_trait::async_trait;

/// Port the dispatcher transmits through. Implementations post to a remote
/// ingestion endpoint or hand updates to an in-process tracking service.
#[async_trait]
pub trait IngestionClient: Send + Sync {
    async fn submit_batch(&self, updates: &[LocationUpdate]) -> DomainResult<()>;
    async fn submit_single(&self, update: &LocationUpdate) -> DomainResult<()>;
}
