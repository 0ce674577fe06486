use crate::common::{DomainError, DomainResult};
use crate::domains::simulation::IngestionClient;
use crate::domains::tracking::LocationUpdate;
use async_trait::async_trait;

/// Posts simulator telemetry to a remote ingestion endpoint over HTTP.
pub struct HttpIngestionClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIngestionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn post(&self, path: &str, body: &impl serde::Serialize) -> DomainResult<()> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(url.as_str())
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::Transmission(format!("Failed to reach {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(DomainError::Transmission(format!(
                "Ingestion endpoint returned {} for {}",
                response.status(),
                url
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl IngestionClient for HttpIngestionClient {
    async fn submit_batch(&self, updates: &[LocationUpdate]) -> DomainResult<()> {
        self.post("/api/v1/agents/location/batch", &updates).await
    }

    async fn submit_single(&self, update: &LocationUpdate) -> DomainResult<()> {
        self.post("/api/v1/agents/location", update).await
    }
}
