use super::trajectory::{GeoBounds, Trajectory};
use crate::domains::tracking::LocationUpdate;
use rand::Rng;

/// The full set of simulated trajectories. The simulation service replaces a
/// `Fleet` wholesale on restart or resize; it is never mutated field-by-field
/// from outside a tick.
#[derive(Debug, Clone)]
pub struct Fleet {
    bounds: GeoBounds,
    trajectories: Vec<Trajectory>,
}

impl Fleet {
    pub fn init<R: Rng>(count: usize, bounds: GeoBounds, rng: &mut R) -> Self {
        let trajectories = (1..=count as i64)
            .map(|agent_id| Trajectory::spawn(agent_id, &bounds, rng))
            .collect();

        Self {
            bounds,
            trajectories,
        }
    }

    /// Advance every trajectory one step and emit one update per agent.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> Vec<LocationUpdate> {
        let mut updates = Vec::with_capacity(self.trajectories.len());
        for trajectory in &mut self.trajectories {
            trajectory.advance(&self.bounds, rng);
            updates.push(trajectory.as_update());
        }
        updates
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    pub fn bounds(&self) -> &GeoBounds {
        &self.bounds
    }

    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }
}
