use fleet_tracker::adapters::inbound::{InMemoryAgentRegistry, InMemoryLocationStore};
use fleet_tracker::adapters::outbound::{KafkaEventSink, LocalIngestionClient, NoopEventSink};
use fleet_tracker::application::{SimulationService, TrackingService, TrackingSettings};
use fleet_tracker::common::CircuitBreakerConfig;
use fleet_tracker::domains::simulation::BatchDispatcher;
use fleet_tracker::domains::tracking::{AgentStatus, LocationEventSink};
use fleet_tracker::Config;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting fleet tracker");

    // Load configuration, falling back to development defaults
    let config = match Config::from_file("config.toml").await {
        Ok(config) => {
            info!("Configuration loaded from config.toml");
            config
        }
        Err(err) => {
            warn!("Could not load config.toml ({}), using defaults", err);
            Config::default()
        }
    };

    let sink: Arc<dyn LocationEventSink> = match KafkaEventSink::new(&config.kafka) {
        Ok(sink) => {
            info!("Kafka event sink ready, brokers: {:?}", config.kafka.brokers);
            Arc::new(sink)
        }
        Err(err) => {
            warn!("Kafka unavailable ({}), downstream events disabled", err);
            Arc::new(NoopEventSink)
        }
    };

    let store = Arc::new(InMemoryLocationStore::new());
    let registry = Arc::new(InMemoryAgentRegistry::with_sink(sink.clone()));

    // The simulator emits agent ids 1..=count; seed the registry so the
    // ingestion pipeline recognizes them.
    for agent_id in 1..=config.simulator.agent_count as i64 {
        registry.register(agent_id, AgentStatus::Available).await;
    }
    info!("Registered {} agents", config.simulator.agent_count);

    let settings = TrackingSettings {
        cache_ttl: Duration::from_secs(config.cache.ttl_secs),
        default_radius_m: config.query.default_radius_m,
        history_lookback_secs: config.query.history_lookback_secs,
        fanout_capacity: 256,
        breaker: CircuitBreakerConfig {
            window_size: config.circuit_breaker.window_size,
            failure_rate_threshold: config.circuit_breaker.failure_rate_threshold,
            open_wait: Duration::from_millis(config.circuit_breaker.open_wait_ms),
        },
    };

    let tracking = Arc::new(TrackingService::new(
        store,
        registry.clone(),
        sink,
        settings,
    ));

    let client = Arc::new(LocalIngestionClient::new(tracking.clone()));
    let dispatcher = BatchDispatcher::new(client, config.ingestion.batch_size);
    let simulation = Arc::new(SimulationService::new(&config.simulator, dispatcher));

    {
        let simulation = simulation.clone();
        tokio::spawn(async move {
            simulation.run().await;
        });
    }

    info!("Fleet tracker started: {:?}", simulation.status());

    // Keep the application running
    tokio::signal::ctrl_c().await?;
    info!("Shutting down fleet tracker");

    Ok(())
}
