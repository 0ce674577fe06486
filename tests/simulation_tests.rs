use async_trait::async_trait;
use fleet_tracker::application::{SimulationService, AGENT_COUNT_MAX};
use fleet_tracker::common::DomainResult;
use fleet_tracker::config::{BoundsConfig, SimulatorConfig};
use fleet_tracker::domains::simulation::{
    BatchDispatcher, Fleet, GeoBounds, IngestionClient, ACCURACY_MAX, ACCURACY_MIN, SPEED_MAX,
    SPEED_MIN, STEPS_MAX, STEPS_MIN,
};
use fleet_tracker::domains::tracking::LocationUpdate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

const SF_BOUNDS: GeoBounds = GeoBounds {
    lat_min: 37.7,
    lat_max: 37.8,
    lng_min: -122.5,
    lng_max: -122.4,
};

/// Transport that accepts everything; the simulation tests only exercise
/// trajectory mechanics.
struct NullClient;

#[async_trait]
impl IngestionClient for NullClient {
    async fn submit_batch(&self, _updates: &[LocationUpdate]) -> DomainResult<()> {
        Ok(())
    }

    async fn submit_single(&self, _update: &LocationUpdate) -> DomainResult<()> {
        Ok(())
    }
}

fn simulator_config(agent_count: usize) -> SimulatorConfig {
    SimulatorConfig {
        agent_count,
        update_interval_ms: 500,
        bounds: BoundsConfig {
            lat_min: SF_BOUNDS.lat_min,
            lat_max: SF_BOUNDS.lat_max,
            lng_min: SF_BOUNDS.lng_min,
            lng_max: SF_BOUNDS.lng_max,
        },
    }
}

fn null_dispatcher() -> BatchDispatcher {
    BatchDispatcher::new(Arc::new(NullClient), 100)
}

#[test]
fn init_draws_every_parameter_inside_its_range() {
    let mut rng = StdRng::seed_from_u64(7);

    for count in [1usize, 2500] {
        let fleet = Fleet::init(count, SF_BOUNDS, &mut rng);
        assert_eq!(fleet.len(), count);

        for trajectory in fleet.trajectories() {
            assert!(SF_BOUNDS.contains(trajectory.latitude, trajectory.longitude));
            assert!(SF_BOUNDS.contains(trajectory.dest_latitude, trajectory.dest_longitude));
            assert!((STEPS_MIN..=STEPS_MAX).contains(&trajectory.steps_remaining));
            assert!((SPEED_MIN..SPEED_MAX).contains(&trajectory.speed));
            assert!((ACCURACY_MIN..ACCURACY_MAX).contains(&trajectory.accuracy));
            assert!((0.0..360.0).contains(&trajectory.heading));
        }
    }
}

#[test]
fn one_tick_advances_each_agent_by_exactly_one_step() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut fleet = Fleet::init(3, SF_BOUNDS, &mut rng);
    let before: Vec<_> = fleet.trajectories().to_vec();

    let updates = fleet.tick(&mut rng);
    assert_eq!(updates.len(), 3);

    for (started, advanced) in before.iter().zip(fleet.trajectories()) {
        assert!((advanced.latitude - (started.latitude + started.lat_step)).abs() < 1e-12);
        assert!((advanced.longitude - (started.longitude + started.lng_step)).abs() < 1e-12);
        assert_eq!(advanced.steps_remaining, started.steps_remaining - 1);
    }
}

#[test]
fn arrival_retargets_on_the_same_tick() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut fleet = Fleet::init(5, SF_BOUNDS, &mut rng);

    for _ in 0..400 {
        let arrived: Vec<i64> = fleet
            .trajectories()
            .iter()
            .filter(|t| t.steps_remaining == 0)
            .map(|t| t.agent_id)
            .collect();

        fleet.tick(&mut rng);

        for agent_id in arrived {
            let trajectory = fleet
                .trajectories()
                .iter()
                .find(|t| t.agent_id == agent_id)
                .unwrap();
            assert!(
                trajectory.steps_remaining > 0,
                "agent {} left stuck at destination",
                agent_id
            );
            assert!(SF_BOUNDS.contains(trajectory.dest_latitude, trajectory.dest_longitude));
        }
    }
}

#[test]
fn retarget_keeps_position_and_resets_step_vector() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut fleet = Fleet::init(1, SF_BOUNDS, &mut rng);

    // Walk the single agent to its destination
    while fleet.trajectories()[0].steps_remaining > 0 {
        fleet.tick(&mut rng);
    }
    let arrived = fleet.trajectories()[0].clone();

    fleet.tick(&mut rng);
    let retargeted = &fleet.trajectories()[0];

    // Re-targeting picks a destination but does not move the agent
    assert!((retargeted.latitude - arrived.latitude).abs() < 1e-12);
    assert!((retargeted.longitude - arrived.longitude).abs() < 1e-12);
    assert!((STEPS_MIN..=STEPS_MAX).contains(&retargeted.steps_remaining));

    let expected_lat_step = (retargeted.dest_latitude - retargeted.latitude)
        / retargeted.steps_remaining as f64;
    assert!((retargeted.lat_step - expected_lat_step).abs() < 1e-12);
}

#[tokio::test]
async fn tick_once_emits_one_update_per_agent() {
    let service = SimulationService::new(&simulator_config(25), null_dispatcher());

    let updates = service.tick_once().await;
    assert_eq!(updates.len(), 25);
    assert!(updates
        .iter()
        .all(|u| u.latitude.is_some() && u.longitude.is_some()));
}

#[tokio::test]
async fn set_agent_count_validates_bounds() {
    let service = SimulationService::new(&simulator_config(10), null_dispatcher());

    assert!(service.set_agent_count(0).await.is_err());
    assert!(service.set_agent_count(AGENT_COUNT_MAX + 1).await.is_err());

    // A rejected resize leaves the running fleet untouched
    assert_eq!(service.live_agent_count().await, 10);
}

#[tokio::test]
async fn set_agent_count_restarts_with_new_fleet() {
    let service = SimulationService::new(&simulator_config(10), null_dispatcher());

    let count = service.set_agent_count(32).await.unwrap();
    assert_eq!(count, 32);
    assert_eq!(service.live_agent_count().await, 32);

    let status = service.status();
    assert_eq!(status.agent_count, 32);
}

#[tokio::test]
async fn status_reports_derived_throughput() {
    let service = SimulationService::new(&simulator_config(2000), null_dispatcher());

    let status = service.status();
    assert_eq!(status.agent_count, 2000);
    assert_eq!(status.update_interval_ms, 500);
    assert!((status.updates_per_second - 4000.0).abs() < 1e-9);
    assert!(!status.active);
}

#[tokio::test]
async fn restart_reinitializes_with_configured_count() {
    let service = SimulationService::new(&simulator_config(8), null_dispatcher());

    // Advance a few ticks, then restart and confirm a full fresh fleet
    service.tick_once().await;
    service.tick_once().await;

    let count = service.restart().await;
    assert_eq!(count, 8);
    assert_eq!(service.live_agent_count().await, 8);
}
