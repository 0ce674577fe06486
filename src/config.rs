use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub simulator: SimulatorConfig,
    pub ingestion: IngestionConfig,
    pub cache: CacheConfig,
    pub query: QueryConfig,
    pub circuit_breaker: CircuitBreakerSettings,
    pub kafka: KafkaConfig,
    pub postgres: PostgresConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub agent_count: usize,
    pub update_interval_ms: u64,
    pub bounds: BoundsConfig,
}

/// Lat/lon box the simulated fleet moves inside.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundsConfig {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    pub batch_size: usize,
    pub endpoint_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub default_radius_m: f64,
    pub history_lookback_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerSettings {
    pub window_size: usize,
    pub failure_rate_threshold: f64,
    pub open_wait_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    pub client_id: String,
    pub topics: KafkaTopics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaTopics {
    pub location_events: String,
    pub agent_status_events: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulator: SimulatorConfig {
                agent_count: 10_000,
                update_interval_ms: 500,
                // San Francisco box used by the development fleet
                bounds: BoundsConfig {
                    lat_min: 37.7,
                    lat_max: 37.8,
                    lng_min: -122.5,
                    lng_max: -122.4,
                },
            },
            ingestion: IngestionConfig {
                batch_size: 100,
                endpoint_url: "http://localhost:8080".to_string(),
            },
            cache: CacheConfig { ttl_secs: 30 },
            query: QueryConfig {
                default_radius_m: 5000.0,
                history_lookback_secs: 3600,
            },
            circuit_breaker: CircuitBreakerSettings {
                window_size: 10,
                failure_rate_threshold: 0.5,
                open_wait_ms: 5000,
            },
            kafka: KafkaConfig {
                brokers: vec!["localhost:9092".to_string()],
                client_id: "fleet-tracker".to_string(),
                topics: KafkaTopics {
                    location_events: "agent-location-events".to_string(),
                    agent_status_events: "agent-status-events".to_string(),
                },
            },
            postgres: PostgresConfig {
                host: "localhost".to_string(),
                port: 5432,
                database: "fleet_tracker".to_string(),
                username: "postgres".to_string(),
                password: "password".to_string(),
                max_connections: 10,
            },
        }
    }
}
