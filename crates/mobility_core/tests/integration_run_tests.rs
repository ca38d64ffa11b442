mod support;

use mobility_core::city::OdMatrix;
use mobility_core::error::SimulationError;
use mobility_core::pricing::PricingConfig;
use mobility_core::report::summarize;
use mobility_core::runner::{collect_stats, run, run_dispatch};
use mobility_core::scenario::DispatchParams;
use mobility_core::telemetry::DispatchTelemetry;
use mobility_core::trip::{FleetMix, TripError};
use support::schedule::ScheduleRunner;
use support::world::TestWorldBuilder;

#[test]
fn same_seed_same_statistics() {
    let a = run(7, 1440).unwrap();
    let b = run(7, 1440).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.scenarios.len(), 3);
}

#[test]
fn different_seeds_diverge() {
    let a = run(1, 1440).unwrap();
    let b = run(2, 1440).unwrap();
    assert_ne!(a.scenarios, b.scenarios);
}

#[test]
fn uniform_fleet_is_deterministic_too() {
    let params = DispatchParams::default()
        .with_seed(9)
        .with_fleet_mix(FleetMix::Uniform);
    let a = run_dispatch(&params).unwrap();
    let b = run_dispatch(&params).unwrap();
    assert_eq!(a, b);
    let kinds: usize = a
        .scenarios
        .iter()
        .map(|s| s.rides_by_kind.len())
        .max()
        .unwrap_or(0);
    assert!(kinds > 1);
}

#[test]
fn busier_scenarios_request_more() {
    let stats = run(42, 1440).unwrap();
    let optimistic = stats.scenario("optimistic").unwrap();
    let pessimistic = stats.scenario("pessimistic").unwrap();
    assert!(optimistic.total_requests > pessimistic.total_requests);
}

#[test]
fn summarize_is_idempotent() {
    let stats = run(3, 1440).unwrap();
    let before = stats.clone();
    let pricing = PricingConfig::default();

    let first = summarize(&stats, &pricing);
    let second = summarize(&stats, &pricing);
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(stats, before);

    let sum: f64 = first.scenarios.iter().map(|s| s.total_value).sum();
    assert!((first.total_value - sum).abs() < 1e-9);
    for scenario in &first.scenarios {
        assert!((scenario.success_rate + scenario.cancellation_rate - 1.0).abs() < 1e-9);
    }
}

#[test]
fn missing_routes_stop_the_run() {
    let mut world = TestWorldBuilder::single_block(2, 1440.0)
        .with_od_matrix(OdMatrix::from_entries(&[]))
        .build();
    let err = ScheduleRunner::new().run_full(&mut world).unwrap_err();
    match err {
        SimulationError::TripGeneration {
            minute,
            scenario,
            source,
        } => {
            assert_eq!(minute, 0);
            assert_eq!(scenario, "solo");
            assert!(matches!(source, TripError::NoKnownRoute { .. }));
        }
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(collect_stats(&world).scenarios[0].total_requests, 0);
}

#[test]
fn snapshots_follow_the_interval() {
    let mut world = TestWorldBuilder::new()
        .with_snapshot_interval(Some(60))
        .build();
    ScheduleRunner::new().run_full(&mut world).unwrap();

    let telemetry = world.resource::<DispatchTelemetry>();
    assert_eq!(telemetry.snapshots.len(), 24 * 3);
    let minutes: Vec<u32> = telemetry.for_scenario("moderate").map(|s| s.minute).collect();
    assert_eq!(minutes, (0..24).map(|h| h * 60).collect::<Vec<_>>());
    assert_eq!(telemetry.snapshots[0].block, "night");
    assert_eq!(telemetry.last_snapshot_at, Some(1380));
}

#[test]
fn disabled_snapshots_capture_nothing() {
    let mut world = TestWorldBuilder::new().with_snapshot_interval(None).build();
    ScheduleRunner::new().run_full(&mut world).unwrap();
    assert!(world.resource::<DispatchTelemetry>().snapshots.is_empty());
}

#[test]
fn snapshots_do_not_change_statistics() {
    let mut with = TestWorldBuilder::new().with_snapshot_interval(Some(1)).build();
    let mut without = TestWorldBuilder::new().with_snapshot_interval(None).build();
    ScheduleRunner::new().run_full(&mut with).unwrap();
    ScheduleRunner::new().run_full(&mut without).unwrap();
    assert_eq!(collect_stats(&with), collect_stats(&without));
    assert_eq!(with.resource::<DispatchTelemetry>().snapshots.len(), 1440 * 3);
}
