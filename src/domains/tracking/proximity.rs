use crate::domains::geo;

/// Strategy seam for the "is this candidate inside the search radius" check.
/// The default is a plain haversine comparison over a linear scan; a spatial
/// index can be substituted here without changing the query contract.
pub trait ProximityMatcher: Send + Sync {
    fn within(
        &self,
        origin_lat: f64,
        origin_lon: f64,
        candidate_lat: f64,
        candidate_lon: f64,
        radius_m: f64,
    ) -> bool;
}

pub struct HaversineMatcher;

impl ProximityMatcher for HaversineMatcher {
    fn within(
        &self,
        origin_lat: f64,
        origin_lon: f64,
        candidate_lat: f64,
        candidate_lon: f64,
        radius_m: f64,
    ) -> bool {
        // Boundary inclusive: a candidate exactly at the radius matches.
        geo::haversine_distance_m(origin_lat, origin_lon, candidate_lat, candidate_lon) <= radius_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_inclusive() {
        let matcher = HaversineMatcher;
        let radius = geo::haversine_distance_m(0.0, 0.0, 0.01, 0.0);
        assert!(matcher.within(0.0, 0.0, 0.01, 0.0, radius));
        assert!(!matcher.within(0.0, 0.0, 0.011, 0.0, radius));
    }
}
