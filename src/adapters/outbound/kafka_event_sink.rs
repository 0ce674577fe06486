use crate::common::{DomainError, DomainResult, EventEnvelope};
use crate::config::{KafkaConfig, KafkaTopics};
use crate::domains::tracking::LocationEventSink;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;

/// Kafka-backed event sink. Delivery is at-least-once: a successful send may
/// still be re-published by a retrying caller, and consumers must tolerate
/// duplicates.
pub struct KafkaEventSink {
    producer: FutureProducer,
    topics: KafkaTopics,
}

impl KafkaEventSink {
    pub fn new(config: &KafkaConfig) -> DomainResult<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("client.id", &config.client_id)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| DomainError::Dependency(format!("Failed to create Kafka producer: {}", e)))?;

        Ok(Self {
            producer,
            topics: config.topics.clone(),
        })
    }

    fn topic_for(&self, event_type: &str) -> &str {
        match event_type {
            "StatusChanged" => &self.topics.agent_status_events,
            _ => &self.topics.location_events,
        }
    }
}

#[async_trait]
impl LocationEventSink for KafkaEventSink {
    async fn publish(&self, envelope: EventEnvelope) -> DomainResult<()> {
        let topic = self.topic_for(&envelope.event_type);
        let key = envelope.agent_id.to_string();

        let payload = serde_json::to_string(&envelope)
            .map_err(|e| DomainError::Dependency(format!("Failed to serialize event: {}", e)))?;

        let record = FutureRecord::to(topic).key(&key).payload(&payload);

        self.producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(e, _)| DomainError::Dependency(format!("Failed to send event to Kafka: {}", e)))?;

        Ok(())
    }
}
