pub mod memory_agent_registry;
pub mod memory_location_store;
pub mod postgres_location_store;

pub use memory_agent_registry::*;
pub use memory_location_store::*;
pub use postgres_location_store::*;
