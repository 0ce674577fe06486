use crate::common::{DomainResult, EventEnvelope};
use crate::domains::tracking::LocationEventSink;
use async_trait::async_trait;

/// No-op sink useful as default in unit tests and when no broker is
/// configured.
pub struct NoopEventSink;

#[async_trait]
impl LocationEventSink for NoopEventSink {
    async fn publish(&self, _envelope: EventEnvelope) -> DomainResult<()> {
        Ok(())
    }
}
