use super::sample::{AgentStatus, LocationSample};
use crate::common::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrackingEvent {
    LocationRecorded {
        agent_id: i64,
        sample: LocationSample,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        agent_id: i64,
        status: AgentStatus,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for TrackingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TrackingEvent::LocationRecorded { .. } => "LocationRecorded",
            TrackingEvent::StatusChanged { .. } => "StatusChanged",
        }
    }

    fn agent_id(&self) -> i64 {
        match self {
            TrackingEvent::LocationRecorded { agent_id, .. } => *agent_id,
            TrackingEvent::StatusChanged { agent_id, .. } => *agent_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TrackingEvent::LocationRecorded { timestamp, .. } => *timestamp,
            TrackingEvent::StatusChanged { timestamp, .. } => *timestamp,
        }
    }
}
