use crate::common::{DomainError, DomainResult};
use crate::config::PostgresConfig;
use crate::domains::tracking::{LocationSample, LocationStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

/// Durable location history backed by PostgreSQL.
pub struct PostgresLocationStore {
    pool: Pool,
}

impl PostgresLocationStore {
    pub async fn new(config: PostgresConfig) -> DomainResult<Self> {
        let mut pg_config = Config::new();
        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);

        let pool = pg_config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DomainError::Dependency(format!("Failed to create PostgreSQL pool: {}", e)))?;

        let store = Self { pool };

        // Initialize database schema
        store.initialize_schema().await?;

        Ok(store)
    }

    async fn initialize_schema(&self) -> DomainResult<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DomainError::Dependency(format!("Failed to get database connection: {}", e)))?;

        let schema = r#"
            CREATE TABLE IF NOT EXISTS agent_locations (
                sample_id UUID PRIMARY KEY,
                agent_id BIGINT NOT NULL,
                latitude DOUBLE PRECISION NOT NULL,
                longitude DOUBLE PRECISION NOT NULL,
                heading DOUBLE PRECISION,
                speed DOUBLE PRECISION,
                accuracy DOUBLE PRECISION,
                recorded_at TIMESTAMPTZ NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_agent_locations_agent_time
            ON agent_locations(agent_id, recorded_at DESC);
        "#;

        client
            .batch_execute(schema)
            .await
            .map_err(|e| DomainError::Dependency(format!("Failed to initialize database schema: {}", e)))?;

        Ok(())
    }

    fn row_to_sample(row: &Row) -> LocationSample {
        LocationSample {
            agent_id: row.get("agent_id"),
            latitude: row.get("latitude"),
            longitude: row.get("longitude"),
            heading: row.get("heading"),
            speed: row.get("speed"),
            accuracy: row.get("accuracy"),
            recorded_at: row.get("recorded_at"),
        }
    }
}

#[async_trait]
impl LocationStore for PostgresLocationStore {
    async fn append(&self, sample: LocationSample) -> DomainResult<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DomainError::Dependency(format!("Failed to get database connection: {}", e)))?;

        let stmt = client
            .prepare(
                "INSERT INTO agent_locations
                 (sample_id, agent_id, latitude, longitude, heading, speed, accuracy, recorded_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .await
            .map_err(|e| DomainError::Dependency(format!("Failed to prepare statement: {}", e)))?;

        client
            .execute(
                &stmt,
                &[
                    &Uuid::new_v4(),
                    &sample.agent_id,
                    &sample.latitude,
                    &sample.longitude,
                    &sample.heading,
                    &sample.speed,
                    &sample.accuracy,
                    &sample.recorded_at,
                ],
            )
            .await
            .map_err(|e| DomainError::Dependency(format!("Failed to insert location sample: {}", e)))?;

        Ok(())
    }

    async fn latest(&self, agent_id: i64) -> DomainResult<Option<LocationSample>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DomainError::Dependency(format!("Failed to get database connection: {}", e)))?;

        let row = client
            .query_opt(
                "SELECT agent_id, latitude, longitude, heading, speed, accuracy, recorded_at
                 FROM agent_locations
                 WHERE agent_id = $1
                 ORDER BY recorded_at DESC
                 LIMIT 1",
                &[&agent_id],
            )
            .await
            .map_err(|e| DomainError::Dependency(format!("Failed to query latest location: {}", e)))?;

        Ok(row.as_ref().map(Self::row_to_sample))
    }

    async fn history_since(
        &self,
        agent_id: i64,
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<LocationSample>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DomainError::Dependency(format!("Failed to get database connection: {}", e)))?;

        let rows = client
            .query(
                "SELECT agent_id, latitude, longitude, heading, speed, accuracy, recorded_at
                 FROM agent_locations
                 WHERE agent_id = $1 AND recorded_at >= $2
                 ORDER BY recorded_at ASC",
                &[&agent_id, &since],
            )
            .await
            .map_err(|e| DomainError::Dependency(format!("Failed to query location history: {}", e)))?;

        Ok(rows.iter().map(Self::row_to_sample).collect())
    }
}
