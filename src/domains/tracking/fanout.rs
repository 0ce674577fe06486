use super::sample::CurrentLocationView;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tokio::sync::RwLock;

/// In-process pub/sub for location updates: one global topic plus a lazily
/// created topic per agent. Channels are bounded; a slow subscriber loses old
/// messages rather than backpressuring ingestion, which is acceptable for
/// advisory telemetry.
pub struct BroadcastFanout {
    capacity: usize,
    global: broadcast::Sender<CurrentLocationView>,
    per_agent: RwLock<HashMap<i64, broadcast::Sender<CurrentLocationView>>>,
}

impl BroadcastFanout {
    pub fn new(capacity: usize) -> Self {
        let (global, _) = broadcast::channel(capacity);
        Self {
            capacity,
            global,
            per_agent: RwLock::new(HashMap::new()),
        }
    }

    pub fn subscribe_all(&self) -> broadcast::Receiver<CurrentLocationView> {
        self.global.subscribe()
    }

    pub async fn subscribe_agent(&self, agent_id: i64) -> broadcast::Receiver<CurrentLocationView> {
        let mut topics = self.per_agent.write().await;
        topics
            .entry(agent_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    pub async fn publish(&self, view: &CurrentLocationView) {
        // A send error only means there are no subscribers right now.
        let _ = self.global.send(view.clone());

        let topics = self.per_agent.read().await;
        if let Some(topic) = topics.get(&view.agent_id) {
            let _ = topic.send(view.clone());
        }
    }
}
