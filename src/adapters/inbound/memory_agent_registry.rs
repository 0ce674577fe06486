use crate::common::{DomainError, DomainResult, EventEnvelope};
use crate::domains::tracking::{
    AgentRegistry, AgentState, AgentStatus, LocationEventSink, TrackingEvent,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// In-memory stand-in for the external agent registry. The tracking core
/// only reads through the `AgentRegistry` port; the mutation surface here
/// belongs to the collaborator, which announces status changes on the event
/// sink.
pub struct InMemoryAgentRegistry {
    agents: RwLock<HashMap<i64, AgentState>>,
    sink: Option<Arc<dyn LocationEventSink>>,
}

impl InMemoryAgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
            sink: None,
        }
    }

    pub fn with_sink(sink: Arc<dyn LocationEventSink>) -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
            sink: Some(sink),
        }
    }

    pub async fn register(&self, agent_id: i64, status: AgentStatus) {
        let mut agents = self.agents.write().await;
        agents.insert(agent_id, AgentState { agent_id, status });
    }

    pub async fn set_status(&self, agent_id: i64, status: AgentStatus) -> DomainResult<AgentState> {
        let state = {
            let mut agents = self.agents.write().await;
            let state = agents
                .get_mut(&agent_id)
                .ok_or(DomainError::AgentNotFound { agent_id })?;
            state.status = status;
            state.clone()
        };

        if let Some(sink) = &self.sink {
            let event = TrackingEvent::StatusChanged {
                agent_id,
                status,
                timestamp: chrono::Utc::now(),
            };
            match EventEnvelope::new(&event, "agent-registry") {
                Ok(envelope) => {
                    if let Err(err) = sink.publish(envelope).await {
                        warn!("Failed to publish status change for agent {}: {}", agent_id, err);
                    }
                }
                Err(err) => warn!("Failed to serialize status change: {}", err),
            }
        }

        Ok(state)
    }
}

impl Default for InMemoryAgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentRegistry for InMemoryAgentRegistry {
    async fn state(&self, agent_id: i64) -> DomainResult<Option<AgentState>> {
        let agents = self.agents.read().await;
        Ok(agents.get(&agent_id).cloned())
    }

    async fn with_status(&self, status: AgentStatus) -> DomainResult<Vec<AgentState>> {
        let agents = self.agents.read().await;
        let mut matching: Vec<AgentState> = agents
            .values()
            .filter(|state| state.status == status)
            .cloned()
            .collect();
        matching.sort_by_key(|state| state.agent_id);
        Ok(matching)
    }
}
