use async_trait::async_trait;
use chrono::{DateTime, Duration as Lookback, Utc};
use fleet_tracker::adapters::inbound::{InMemoryAgentRegistry, InMemoryLocationStore};
use fleet_tracker::adapters::outbound::NoopEventSink;
use fleet_tracker::application::{TrackingService, TrackingSettings};
use fleet_tracker::common::{ApplicationError, CircuitState, DomainError, DomainResult};
use fleet_tracker::domains::geo;
use fleet_tracker::domains::tracking::{
    AgentStatus, LocationSample, LocationStore, LocationUpdate,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn update(agent_id: i64, latitude: f64, longitude: f64) -> LocationUpdate {
    LocationUpdate {
        agent_id,
        latitude: Some(latitude),
        longitude: Some(longitude),
        heading: Some(90.0),
        speed: Some(35.0),
        accuracy: Some(5.0),
    }
}

fn service(
    store: Arc<dyn LocationStore>,
    registry: Arc<InMemoryAgentRegistry>,
    cache_ttl: Duration,
) -> TrackingService {
    TrackingService::new(
        store,
        registry,
        Arc::new(NoopEventSink),
        TrackingSettings {
            cache_ttl,
            ..Default::default()
        },
    )
}

/// Store wrapper that counts reads of the latest-sample lookup.
struct CountingStore {
    inner: InMemoryLocationStore,
    latest_calls: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: InMemoryLocationStore::new(),
            latest_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LocationStore for CountingStore {
    async fn append(&self, sample: LocationSample) -> DomainResult<()> {
        self.inner.append(sample).await
    }

    async fn latest(&self, agent_id: i64) -> DomainResult<Option<LocationSample>> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.latest(agent_id).await
    }

    async fn history_since(
        &self,
        agent_id: i64,
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<LocationSample>> {
        self.inner.history_since(agent_id, since).await
    }
}

/// Store whose writes always fail, to drive the circuit breaker.
struct FailingStore;

#[async_trait]
impl LocationStore for FailingStore {
    async fn append(&self, _sample: LocationSample) -> DomainResult<()> {
        Err(DomainError::Dependency("store is down".to_string()))
    }

    async fn latest(&self, _agent_id: i64) -> DomainResult<Option<LocationSample>> {
        Ok(None)
    }

    async fn history_since(
        &self,
        _agent_id: i64,
        _since: DateTime<Utc>,
    ) -> DomainResult<Vec<LocationSample>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn ingest_rejects_unknown_agent() {
    let registry = Arc::new(InMemoryAgentRegistry::new());
    let tracking = service(
        Arc::new(InMemoryLocationStore::new()),
        registry,
        Duration::from_secs(30),
    );

    let err = tracking.ingest(update(42, 37.75, -122.45)).await.unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::AgentNotFound { agent_id: 42 })
    ));
}

#[tokio::test]
async fn ingest_rejects_missing_coordinates() {
    let registry = Arc::new(InMemoryAgentRegistry::new());
    registry.register(7, AgentStatus::Available).await;
    let tracking = service(
        Arc::new(InMemoryLocationStore::new()),
        registry,
        Duration::from_secs(30),
    );

    let mut missing_lat = update(7, 0.0, -122.45);
    missing_lat.latitude = None;

    let err = tracking.ingest(missing_lat).await.unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn ingest_persists_caches_and_broadcasts() {
    let store = Arc::new(InMemoryLocationStore::new());
    let registry = Arc::new(InMemoryAgentRegistry::new());
    registry.register(7, AgentStatus::Available).await;
    let tracking = service(store.clone(), registry, Duration::from_secs(30));

    let mut all_rx = tracking.subscribe_all();
    let mut agent_rx = tracking.subscribe_agent(7).await;

    let view = tracking.ingest(update(7, 37.75, -122.45)).await.unwrap();
    assert!(view.durable);
    assert_eq!(store.sample_count(7).await, 1);

    let broadcast = all_rx.recv().await.unwrap();
    assert_eq!(broadcast.agent_id, 7);
    let targeted = agent_rx.recv().await.unwrap();
    assert_eq!(targeted.agent_id, 7);

    let current = tracking.current_location(7).await.unwrap();
    assert!(current.durable);
    assert!((current.latitude - 37.75).abs() < 1e-12);
}

#[tokio::test]
async fn cache_serves_repeated_reads_without_store_access() {
    let store = Arc::new(CountingStore::new());
    let registry = Arc::new(InMemoryAgentRegistry::new());
    registry.register(7, AgentStatus::Available).await;
    let tracking = service(store.clone(), registry, Duration::from_secs(30));

    tracking.ingest(update(7, 37.75, -122.45)).await.unwrap();

    tracking.current_location(7).await.unwrap();
    tracking.current_location(7).await.unwrap();
    assert_eq!(store.latest_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cache_expiry_forces_readthrough_and_repopulates() {
    let store = Arc::new(CountingStore::new());
    let registry = Arc::new(InMemoryAgentRegistry::new());
    registry.register(7, AgentStatus::Available).await;
    let tracking = service(store.clone(), registry, Duration::from_millis(150));

    tracking.ingest(update(7, 37.75, -122.45)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    tracking.current_location(7).await.unwrap();
    assert_eq!(store.latest_calls.load(Ordering::SeqCst), 1);

    // Repopulated: the next read stays in cache
    tracking.current_location(7).await.unwrap();
    assert_eq!(store.latest_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn current_location_without_history_is_not_found() {
    let registry = Arc::new(InMemoryAgentRegistry::new());
    registry.register(7, AgentStatus::Available).await;
    let tracking = service(
        Arc::new(InMemoryLocationStore::new()),
        registry,
        Duration::from_secs(30),
    );

    let err = tracking.current_location(7).await.unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::LocationUnknown { agent_id: 7 })
    ));
}

#[tokio::test]
async fn nearby_filters_by_status_radius_and_position() {
    let store = Arc::new(InMemoryLocationStore::new());
    let registry = Arc::new(InMemoryAgentRegistry::new());
    let tracking = service(store, registry.clone(), Duration::from_secs(30));

    let origin = (37.75, -122.45);
    let boundary_lat = origin.0 + 0.01;
    let radius = geo::haversine_distance_m(origin.0, origin.1, boundary_lat, origin.1);

    registry.register(1, AgentStatus::Available).await;
    registry.register(2, AgentStatus::Available).await;
    registry.register(3, AgentStatus::Busy).await;
    registry.register(4, AgentStatus::Available).await; // never reports a position
    registry.register(5, AgentStatus::Available).await;

    // Ingest out of id order to exercise the stable sort
    tracking.ingest(update(2, boundary_lat, origin.1)).await.unwrap();
    tracking.ingest(update(1, origin.0, origin.1)).await.unwrap();
    tracking.ingest(update(3, origin.0, origin.1)).await.unwrap();
    tracking.ingest(update(5, origin.0 + 1.0, origin.1)).await.unwrap();

    let nearby = tracking
        .nearby_agents(origin.0, origin.1, Some(radius))
        .await
        .unwrap();

    let ids: Vec<i64> = nearby.iter().map(|agent| agent.agent_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(nearby
        .iter()
        .all(|agent| agent.status == AgentStatus::Available));
}

#[tokio::test]
async fn nearby_uses_default_radius() {
    let store = Arc::new(InMemoryLocationStore::new());
    let registry = Arc::new(InMemoryAgentRegistry::new());
    let tracking = service(store, registry.clone(), Duration::from_secs(30));

    registry.register(1, AgentStatus::Available).await;
    // ~1.1km north of the origin, well inside the default 5000m
    tracking.ingest(update(1, 37.76, -122.45)).await.unwrap();

    let nearby = tracking.nearby_agents(37.75, -122.45, None).await.unwrap();
    assert_eq!(nearby.len(), 1);
}

#[tokio::test]
async fn history_defaults_to_one_hour_lookback() {
    let store = Arc::new(InMemoryLocationStore::new());
    let registry = Arc::new(InMemoryAgentRegistry::new());
    registry.register(7, AgentStatus::Available).await;
    let tracking = service(store.clone(), registry, Duration::from_secs(30));

    let old = LocationSample {
        agent_id: 7,
        latitude: 37.70,
        longitude: -122.48,
        heading: None,
        speed: None,
        accuracy: None,
        recorded_at: Utc::now() - Lookback::hours(2),
    };
    store.append(old).await.unwrap();
    tracking.ingest(update(7, 37.75, -122.45)).await.unwrap();

    let recent = tracking.location_history(7, None).await.unwrap();
    assert_eq!(recent.len(), 1);

    let full = tracking
        .location_history(7, Some(Utc::now() - Lookback::hours(3)))
        .await
        .unwrap();
    assert_eq!(full.len(), 2);
}

#[tokio::test]
async fn batch_ingest_isolates_item_failures() {
    let store = Arc::new(InMemoryLocationStore::new());
    let registry = Arc::new(InMemoryAgentRegistry::new());
    registry.register(1, AgentStatus::Available).await;
    let tracking = service(store.clone(), registry, Duration::from_secs(30));

    let mut missing_lng = update(1, 37.75, 0.0);
    missing_lng.longitude = None;

    let outcomes = tracking
        .ingest_batch(vec![
            update(1, 37.75, -122.45),
            update(99, 37.75, -122.45),
            missing_lng,
        ])
        .await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].accepted);
    assert!(!outcomes[1].accepted);
    assert!(!outcomes[2].accepted);
    assert_eq!(store.sample_count(1).await, 1);
}

#[tokio::test]
async fn persistence_failure_degrades_and_opens_circuit() {
    let registry = Arc::new(InMemoryAgentRegistry::new());
    registry.register(7, AgentStatus::Available).await;
    let tracking = service(Arc::new(FailingStore), registry, Duration::from_secs(30));

    // Every ingest fails persistence but still answers with an echo
    for _ in 0..10 {
        let view = tracking.ingest(update(7, 37.75, -122.45)).await.unwrap();
        assert!(!view.durable);
    }
    assert_eq!(tracking.breaker_state().await, CircuitState::Open);

    // Short-circuited, still degraded rather than an error
    let view = tracking.ingest(update(7, 37.75, -122.45)).await.unwrap();
    assert!(!view.durable);

    // Nothing was cached or stored along the way
    let err = tracking.current_location(7).await.unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::LocationUnknown { .. })
    ));
}
