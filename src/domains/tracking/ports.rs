use super::sample::{AgentState, AgentStatus, LocationSample};
use crate::common::{DomainResult, EventEnvelope};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Port for the durable location history. History is append-only per agent;
/// `history_since` returns samples in ascending `recorded_at` order.
#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn append(&self, sample: LocationSample) -> DomainResult<()>;
    async fn latest(&self, agent_id: i64) -> DomainResult<Option<LocationSample>>;
    async fn history_since(
        &self,
        agent_id: i64,
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<LocationSample>>;
}

/// Port to the external collaborator that owns agent records and status.
/// The tracking core never mutates status through this port.
#[async_trait]
pub trait AgentRegistry: Send + Sync {
    async fn state(&self, agent_id: i64) -> DomainResult<Option<AgentState>>;
    async fn with_status(&self, status: AgentStatus) -> DomainResult<Vec<AgentState>>;
}

/// Port for the downstream event sink. Delivery is at-least-once with no
/// dedup; consumers are unrelated workflows.
#[async_trait]
pub trait LocationEventSink: Send + Sync {
    async fn publish(&self, envelope: EventEnvelope) -> DomainResult<()>;
}
