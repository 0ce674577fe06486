use crate::common::{ApplicationResult, DomainError};
use crate::config::SimulatorConfig;
use crate::domains::simulation::{BatchDispatcher, Fleet, GeoBounds};
use crate::domains::tracking::LocationUpdate;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const AGENT_COUNT_MIN: usize = 1;
pub const AGENT_COUNT_MAX: usize = 50_000;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationStatus {
    pub active: bool,
    pub agent_count: usize,
    pub update_interval_ms: u64,
    pub updates_per_second: f64,
}

/// Owns the simulated fleet and the tick cadence.
///
/// The fleet lives behind a single RwLock and is only ever replaced
/// wholesale; a tick or status query sees either the old fleet or the new
/// one, never a mix. Transmission is handed to the dispatcher and never
/// awaited from the tick loop.
pub struct SimulationService {
    fleet: RwLock<Fleet>,
    dispatcher: BatchDispatcher,
    bounds: GeoBounds,
    configured_count: AtomicUsize,
    update_interval: Duration,
    active: AtomicBool,
}

impl SimulationService {
    pub fn new(config: &SimulatorConfig, dispatcher: BatchDispatcher) -> Self {
        let bounds = GeoBounds {
            lat_min: config.bounds.lat_min,
            lat_max: config.bounds.lat_max,
            lng_min: config.bounds.lng_min,
            lng_max: config.bounds.lng_max,
        };

        let fleet = {
            let mut rng = rand::thread_rng();
            Fleet::init(config.agent_count, bounds, &mut rng)
        };
        info!("Initialized fleet of {} simulated agents", fleet.len());

        Self {
            fleet: RwLock::new(fleet),
            dispatcher,
            bounds,
            configured_count: AtomicUsize::new(config.agent_count),
            update_interval: Duration::from_millis(config.update_interval_ms),
            active: AtomicBool::new(false),
        }
    }

    /// Fixed-delay tick loop: the next tick is scheduled only after this
    /// tick's position updates complete, so overlapping ticks cannot race on
    /// the trajectory set. A slow ingestion endpoint never delays the loop.
    pub async fn run(&self) {
        self.active.store(true, Ordering::SeqCst);
        info!(
            "Simulation loop started, interval {}ms",
            self.update_interval.as_millis()
        );

        loop {
            let updates = self.tick_once().await;
            debug!("Tick produced {} location updates", updates.len());
            self.dispatcher.dispatch_tick(updates);
            tokio::time::sleep(self.update_interval).await;
        }
    }

    /// Advance every trajectory once and return the tick's updates.
    pub async fn tick_once(&self) -> Vec<LocationUpdate> {
        let mut fleet = self.fleet.write().await;
        let mut rng = rand::thread_rng();
        fleet.tick(&mut rng)
    }

    /// Reinitialize all trajectories with the currently configured count.
    pub async fn restart(&self) -> usize {
        let count = self.configured_count.load(Ordering::SeqCst);
        let fresh = {
            let mut rng = rand::thread_rng();
            Fleet::init(count, self.bounds, &mut rng)
        };

        *self.fleet.write().await = fresh;
        info!("Simulation restarted with {} agents", count);
        count
    }

    /// Change the fleet size. Triggers a full restart; the new fleet becomes
    /// visible atomically.
    pub async fn set_agent_count(&self, count: usize) -> ApplicationResult<usize> {
        if !(AGENT_COUNT_MIN..=AGENT_COUNT_MAX).contains(&count) {
            return Err(DomainError::Validation {
                reason: format!(
                    "Agent count must be between {} and {}",
                    AGENT_COUNT_MIN, AGENT_COUNT_MAX
                ),
            }
            .into());
        }

        self.configured_count.store(count, Ordering::SeqCst);
        Ok(self.restart().await)
    }

    pub fn status(&self) -> SimulationStatus {
        let agent_count = self.configured_count.load(Ordering::SeqCst);
        let update_interval_ms = self.update_interval.as_millis() as u64;

        SimulationStatus {
            active: self.active.load(Ordering::SeqCst),
            agent_count,
            update_interval_ms,
            updates_per_second: agent_count as f64 * 1000.0 / update_interval_ms as f64,
        }
    }

    pub async fn live_agent_count(&self) -> usize {
        self.fleet.read().await.len()
    }
}
