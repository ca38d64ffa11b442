//! Test helpers for common test setup and utilities.
//!
//! Shared by unit tests, integration tests and benches.

use std::collections::BTreeMap;

use bevy_ecs::prelude::World;

use crate::demand::{DemandBlockSpec, DemandTable};
use crate::trip::TripRequest;
use crate::vehicle::VehicleKind;
use crate::weather::Weather;

/// Origin zone used by [`test_request`].
pub const TEST_ORIGIN: &str = "Centrum";
/// Destination zone used by [`test_request`].
pub const TEST_DESTINATION: &str = "TU/e";

/// A single-passenger bike request on empty roads in clear weather that takes
/// exactly `duration_minutes` to ride.
///
/// # Panics
///
/// Panics if the fixed bike trip cannot be built (should never happen).
pub fn test_request(arrival_minute: u32, duration_minutes: u32) -> TripRequest {
    // Bikes ride 18 km/h on empty roads: 0.3 km per minute.
    TripRequest::new(
        arrival_minute,
        TEST_ORIGIN.to_string(),
        TEST_DESTINATION.to_string(),
        f64::from(duration_minutes) * 0.3,
        VehicleKind::Bike,
        1,
        Weather::Clear,
        0,
    )
    .expect("fixed bike trip is valid")
}

/// One block spec with the given vehicles and per-scenario arrival counts.
pub fn block_spec(
    start: &str,
    end: &str,
    riders: u32,
    minutes: u32,
    arrivals: &[(&str, f64)],
) -> DemandBlockSpec {
    DemandBlockSpec {
        start: start.to_string(),
        end: end.to_string(),
        riders,
        minutes,
        arrivals: arrivals
            .iter()
            .map(|(scenario, count)| (scenario.to_string(), *count))
            .collect(),
    }
}

/// A table whose single `night` block covers the whole day.
///
/// An arrival count of `1440.0` means one arrival every minute.
pub fn whole_day_table(riders: u32, arrivals: &[(&str, f64)]) -> DemandTable {
    demand_table(vec![("night", block_spec("00:00", "00:00", riders, 1440, arrivals))])
}

pub fn demand_table(blocks: Vec<(&str, DemandBlockSpec)>) -> DemandTable {
    DemandTable {
        time_blocks: blocks
            .into_iter()
            .map(|(name, spec)| (name.to_string(), spec))
            .collect::<BTreeMap<_, _>>(),
    }
}

/// Create a basic test world with the resources every system reads.
///
/// For a full run use [`crate::scenario::build_scenario`].
pub fn create_test_world() -> World {
    let mut world = World::new();
    world.insert_resource(crate::clock::SimulationClock::default());
    world.insert_resource(crate::scenario::DispatchConfig::default());
    world.insert_resource(crate::scenario::SnapshotConfig::default());
    world.insert_resource(crate::telemetry::DispatchTelemetry::default());
    world.insert_resource(crate::trip::TripFactory::default());
    world.insert_resource(crate::ecs::SimRng::seeded(crate::scenario::DEFAULT_SEED));
    world.insert_resource(crate::ecs::GenerationFault::default());
    world
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_takes_the_requested_minutes() {
        for minutes in [0, 1, 5, 17, 60] {
            assert_eq!(test_request(3, minutes).duration_minutes(), minutes);
        }
    }

    #[test]
    fn whole_day_table_builds_a_schedule() {
        let table = whole_day_table(2, &[("only", 10.0)]);
        let schedule =
            crate::demand::DemandSchedule::new(&table, &["only".to_string()]).unwrap();
        assert_eq!(schedule.blocks().len(), 1);
        assert_eq!(schedule.block_for_minute(0).name, "night");
        assert_eq!(schedule.block_for_minute(1439).name, "night");
    }
}
