pub mod simulation_service;
pub mod tracking_service;

pub use simulation_service::*;
pub use tracking_service::*;
