use crate::common::{
    ApplicationResult, CircuitBreaker, CircuitBreakerConfig, CircuitState, DomainError,
    DomainResult, EventEnvelope,
};
use crate::domains::tracking::{
    AgentRegistry, AgentStatus, BatchItemOutcome, BroadcastFanout, CurrentLocationView,
    HaversineMatcher, LocationCache, LocationEventSink, LocationSample, LocationStore,
    LocationUpdate, NearbyAgent, ProximityMatcher, TrackingEvent,
};
use chrono::{DateTime, Duration as Lookback, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, warn};

const EVENT_SOURCE: &str = "fleet-tracker";

#[derive(Debug, Clone)]
pub struct TrackingSettings {
    pub cache_ttl: Duration,
    pub default_radius_m: f64,
    pub history_lookback_secs: i64,
    pub fanout_capacity: usize,
    pub breaker: CircuitBreakerConfig,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30),
            default_radius_m: 5000.0,
            history_lookback_secs: 3600,
            fanout_capacity: 256,
            breaker: CircuitBreakerConfig::default(),
        }
    }
}

/// The ingestion pipeline and query surface over agent locations.
///
/// Ingestion validates a sample against the external registry, then runs the
/// persist + cache + broadcast sequence under a circuit breaker. While the
/// circuit is open the caller gets an echo of the input coordinates marked
/// non-durable instead of an error.
pub struct TrackingService {
    store: Arc<dyn LocationStore>,
    registry: Arc<dyn AgentRegistry>,
    sink: Arc<dyn LocationEventSink>,
    cache: LocationCache,
    fanout: BroadcastFanout,
    matcher: Box<dyn ProximityMatcher>,
    breaker: CircuitBreaker,
    default_radius_m: f64,
    history_lookback: Lookback,
}

impl TrackingService {
    pub fn new(
        store: Arc<dyn LocationStore>,
        registry: Arc<dyn AgentRegistry>,
        sink: Arc<dyn LocationEventSink>,
        settings: TrackingSettings,
    ) -> Self {
        Self {
            store,
            registry,
            sink,
            cache: LocationCache::new(settings.cache_ttl),
            fanout: BroadcastFanout::new(settings.fanout_capacity),
            matcher: Box::new(HaversineMatcher),
            breaker: CircuitBreaker::new(settings.breaker),
            default_radius_m: settings.default_radius_m,
            history_lookback: Lookback::seconds(settings.history_lookback_secs),
        }
    }

    /// Swap the proximity strategy (e.g. for a spatial index) without
    /// changing the query contract.
    pub fn with_matcher(mut self, matcher: Box<dyn ProximityMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Ingest a single sample: validate, persist, refresh the cache, fan out
    /// to subscribers and the external event sink.
    pub async fn ingest(&self, update: LocationUpdate) -> ApplicationResult<CurrentLocationView> {
        let agent_id = update.agent_id;
        if self.registry.state(agent_id).await?.is_none() {
            return Err(DomainError::AgentNotFound { agent_id }.into());
        }

        let sample = update.into_sample(Utc::now())?;

        let outcome = self
            .breaker
            .call(|| async {
                self.store.append(sample.clone()).await?;
                self.cache.put(sample.clone()).await;

                let view = CurrentLocationView::durable(&sample);
                self.fanout.publish(&view).await;
                self.publish_recorded(&sample).await;
                Ok::<_, DomainError>(view)
            })
            .await;

        match outcome {
            Ok(Ok(view)) => Ok(view),
            Ok(Err(err)) => {
                warn!("Ingest degraded for agent {}: {}", agent_id, err);
                Ok(CurrentLocationView::degraded(&sample))
            }
            Err(_open) => {
                warn!(
                    "Circuit open, echoing location for agent {} without persistence",
                    agent_id
                );
                Ok(CurrentLocationView::degraded(&sample))
            }
        }
    }

    /// Ingest a batch item-by-item. One item's failure never aborts the rest;
    /// callers get a per-item outcome list.
    pub async fn ingest_batch(&self, updates: Vec<LocationUpdate>) -> Vec<BatchItemOutcome> {
        let mut outcomes = Vec::with_capacity(updates.len());
        for update in updates {
            let agent_id = update.agent_id;
            match self.ingest(update).await {
                Ok(_) => outcomes.push(BatchItemOutcome {
                    agent_id,
                    accepted: true,
                    rejection: None,
                }),
                Err(err) => {
                    debug!("Rejected batch item for agent {}: {}", agent_id, err);
                    outcomes.push(BatchItemOutcome {
                        agent_id,
                        accepted: false,
                        rejection: Some(err.to_string()),
                    });
                }
            }
        }
        outcomes
    }

    pub async fn current_location(&self, agent_id: i64) -> ApplicationResult<CurrentLocationView> {
        match self.resolve_current(agent_id).await? {
            Some(sample) => Ok(CurrentLocationView::durable(&sample)),
            None => Err(DomainError::LocationUnknown { agent_id }.into()),
        }
    }

    /// Location history since the given time, defaulting to a one-hour
    /// lookback window.
    pub async fn location_history(
        &self,
        agent_id: i64,
        since: Option<DateTime<Utc>>,
    ) -> ApplicationResult<Vec<LocationSample>> {
        let since = since.unwrap_or_else(|| Utc::now() - self.history_lookback);
        Ok(self.store.history_since(agent_id, since).await?)
    }

    /// All AVAILABLE agents within `radius_m` of the given point, boundary
    /// inclusive, sorted by agent id. Linear scan over the candidates;
    /// agents with no recorded position are skipped.
    pub async fn nearby_agents(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: Option<f64>,
    ) -> ApplicationResult<Vec<NearbyAgent>> {
        let radius_m = radius_m.unwrap_or(self.default_radius_m);
        let available = self.registry.with_status(AgentStatus::Available).await?;

        let mut matches = Vec::new();
        for state in available {
            let sample = match self.resolve_current(state.agent_id).await {
                Ok(Some(sample)) => sample,
                Ok(None) => continue,
                Err(err) => {
                    warn!(
                        "Skipping agent {} in proximity scan: {}",
                        state.agent_id, err
                    );
                    continue;
                }
            };

            if self.matcher.within(
                latitude,
                longitude,
                sample.latitude,
                sample.longitude,
                radius_m,
            ) {
                matches.push(NearbyAgent {
                    agent_id: state.agent_id,
                    status: state.status,
                    location: sample,
                });
            }
        }

        matches.sort_by_key(|nearby| nearby.agent_id);
        Ok(matches)
    }

    pub fn subscribe_all(&self) -> broadcast::Receiver<CurrentLocationView> {
        self.fanout.subscribe_all()
    }

    pub async fn subscribe_agent(&self, agent_id: i64) -> broadcast::Receiver<CurrentLocationView> {
        self.fanout.subscribe_agent(agent_id).await
    }

    pub async fn breaker_state(&self) -> CircuitState {
        self.breaker.state().await
    }

    /// Read-through resolution of an agent's latest sample: fresh cache entry
    /// if present, otherwise the store's latest with cache repopulation.
    async fn resolve_current(&self, agent_id: i64) -> DomainResult<Option<LocationSample>> {
        if let Some(sample) = self.cache.get(agent_id).await {
            return Ok(Some(sample));
        }

        match self.store.latest(agent_id).await? {
            Some(sample) => {
                self.cache.put(sample.clone()).await;
                Ok(Some(sample))
            }
            None => Ok(None),
        }
    }

    async fn publish_recorded(&self, sample: &LocationSample) {
        let event = TrackingEvent::LocationRecorded {
            agent_id: sample.agent_id,
            sample: sample.clone(),
            timestamp: Utc::now(),
        };

        match EventEnvelope::new(&event, EVENT_SOURCE) {
            Ok(envelope) => {
                if let Err(err) = self.sink.publish(envelope).await {
                    warn!(
                        "Failed to publish location event for agent {}: {}",
                        sample.agent_id, err
                    );
                }
            }
            Err(err) => warn!("Failed to serialize location event: {}", err),
        }
    }
}
