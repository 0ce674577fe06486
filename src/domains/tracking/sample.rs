use crate::common::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an agent. Owned by the external agent registry; the
/// tracking core only ever reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    Offline,
    Available,
    Busy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub agent_id: i64,
    pub status: AgentStatus,
}

/// One recorded telemetry point. Immutable once stored; history per agent is
/// append-only and unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSample {
    pub agent_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub accuracy: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

/// Raw ingestion request. Latitude/longitude are required but arrive optional
/// so a missing field surfaces as a validation error instead of a parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub agent_id: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub accuracy: Option<f64>,
}

impl LocationUpdate {
    /// Check the required fields and mint the immutable sample.
    pub fn into_sample(self, recorded_at: DateTime<Utc>) -> DomainResult<LocationSample> {
        let latitude = self.latitude.ok_or_else(|| DomainError::Validation {
            reason: format!("Missing latitude for agent {}", self.agent_id),
        })?;
        let longitude = self.longitude.ok_or_else(|| DomainError::Validation {
            reason: format!("Missing longitude for agent {}", self.agent_id),
        })?;

        Ok(LocationSample {
            agent_id: self.agent_id,
            latitude,
            longitude,
            heading: self.heading,
            speed: self.speed,
            accuracy: self.accuracy,
            recorded_at,
        })
    }
}

/// Caller-facing view of an agent's current location.
///
/// `durable` is false when the circuit breaker shunted the ingest to the
/// degraded fallback: the coordinates were received but not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentLocationView {
    pub agent_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub accuracy: Option<f64>,
    pub recorded_at: DateTime<Utc>,
    pub durable: bool,
}

impl CurrentLocationView {
    pub fn durable(sample: &LocationSample) -> Self {
        Self {
            agent_id: sample.agent_id,
            latitude: sample.latitude,
            longitude: sample.longitude,
            heading: sample.heading,
            speed: sample.speed,
            accuracy: sample.accuracy,
            recorded_at: sample.recorded_at,
            durable: true,
        }
    }

    /// Echo of the input coordinates when persistence is unavailable.
    pub fn degraded(sample: &LocationSample) -> Self {
        Self {
            durable: false,
            ..Self::durable(sample)
        }
    }
}

/// Per-item result of a batch ingest. The batch itself is never aborted; each
/// item succeeds or fails on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemOutcome {
    pub agent_id: i64,
    pub accepted: bool,
    pub rejection: Option<String>,
}

/// A match from the proximity query, current location attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyAgent {
    pub agent_id: i64,
    pub status: AgentStatus,
    pub location: LocationSample,
}
