use crate::domains::geo;
use crate::domains::tracking::LocationUpdate;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Steps drawn per leg of the random walk.
pub const STEPS_MIN: u32 = 50;
pub const STEPS_MAX: u32 = 150;
/// Speed range in km/h.
pub const SPEED_MIN: f64 = 15.0;
pub const SPEED_MAX: f64 = 60.0;
/// GPS accuracy range in meters.
pub const ACCURACY_MIN: f64 = 3.0;
pub const ACCURACY_MAX: f64 = 10.0;

/// Lat/lon box the fleet moves inside.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl GeoBounds {
    pub fn sample_point<R: Rng>(&self, rng: &mut R) -> (f64, f64) {
        (
            rng.gen_range(self.lat_min..self.lat_max),
            rng.gen_range(self.lng_min..self.lng_max),
        )
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lng >= self.lng_min && lng <= self.lng_max
    }
}

/// One agent's piecewise-linear walk: current position, destination, and the
/// per-tick step vector. Lives only for the process lifetime, never persisted.
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub agent_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub dest_latitude: f64,
    pub dest_longitude: f64,
    pub heading: f64,
    pub speed: f64,
    pub accuracy: f64,
    pub steps_remaining: u32,
    pub lat_step: f64,
    pub lng_step: f64,
}

impl Trajectory {
    pub fn spawn<R: Rng>(agent_id: i64, bounds: &GeoBounds, rng: &mut R) -> Self {
        let (latitude, longitude) = bounds.sample_point(rng);
        let (dest_latitude, dest_longitude) = bounds.sample_point(rng);
        let steps = rng.gen_range(STEPS_MIN..STEPS_MAX);

        Self {
            agent_id,
            latitude,
            longitude,
            dest_latitude,
            dest_longitude,
            heading: geo::initial_bearing_deg(latitude, longitude, dest_latitude, dest_longitude),
            speed: rng.gen_range(SPEED_MIN..SPEED_MAX),
            accuracy: rng.gen_range(ACCURACY_MIN..ACCURACY_MAX),
            steps_remaining: steps,
            lat_step: (dest_latitude - latitude) / steps as f64,
            lng_step: (dest_longitude - longitude) / steps as f64,
        }
    }

    /// Advance one tick. A trajectory that arrived (steps_remaining == 0) is
    /// re-targeted on this same tick, so no agent is ever stuck.
    pub fn advance<R: Rng>(&mut self, bounds: &GeoBounds, rng: &mut R) {
        if self.steps_remaining > 0 {
            self.latitude += self.lat_step;
            self.longitude += self.lng_step;
            self.steps_remaining -= 1;
        } else {
            self.retarget(bounds, rng);
        }
    }

    /// Pick a new destination from the current position: fresh step count and
    /// step vector, recomputed heading, re-rolled speed.
    fn retarget<R: Rng>(&mut self, bounds: &GeoBounds, rng: &mut R) {
        let (dest_latitude, dest_longitude) = bounds.sample_point(rng);
        let steps = rng.gen_range(STEPS_MIN..STEPS_MAX);

        self.dest_latitude = dest_latitude;
        self.dest_longitude = dest_longitude;
        self.steps_remaining = steps;
        self.lat_step = (dest_latitude - self.latitude) / steps as f64;
        self.lng_step = (dest_longitude - self.longitude) / steps as f64;
        self.heading = geo::initial_bearing_deg(
            self.latitude,
            self.longitude,
            dest_latitude,
            dest_longitude,
        );
        self.speed = rng.gen_range(SPEED_MIN..SPEED_MAX);
    }

    pub fn as_update(&self) -> LocationUpdate {
        LocationUpdate {
            agent_id: self.agent_id,
            latitude: Some(self.latitude),
            longitude: Some(self.longitude),
            heading: Some(self.heading),
            speed: Some(self.speed),
            accuracy: Some(self.accuracy),
        }
    }
}
