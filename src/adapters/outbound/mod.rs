pub mod http_ingestion_client;
pub mod kafka_event_sink;
pub mod local_ingestion_client;
pub mod noop_event_sink;

pub use http_ingestion_client::*;
pub use kafka_event_sink::*;
pub use local_ingestion_client::*;
pub use noop_event_sink::*;
