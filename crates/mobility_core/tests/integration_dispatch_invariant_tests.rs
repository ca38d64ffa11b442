mod support;

use mobility_core::runner::{collect_stats, finalize_day, scenario_states};
use support::schedule::ScheduleRunner;
use support::world::TestWorldBuilder;

#[test]
fn requests_balance_after_every_minute() {
    let mut world = TestWorldBuilder::new().with_seed(11).build();
    let mut runner = ScheduleRunner::new();

    let mut checked = 0;
    runner
        .run_full_with_hook(&mut world, |world, minute| {
            for state in scenario_states(world) {
                assert!(
                    state.is_balanced(),
                    "{} out of balance at minute {minute}",
                    state.name
                );
            }
            checked += 1;
        })
        .unwrap();
    assert_eq!(checked, 1440);

    for state in scenario_states(&world) {
        assert_eq!(state.pending_len(), 0);
        assert!(state.is_balanced());
    }
}

#[test]
fn end_of_day_cancels_exactly_what_was_queued() {
    // Too few vehicles and patient riders: the queue grows all day.
    let mut world = TestWorldBuilder::single_block(1, 1440.0)
        .with_cancel_probability(0.0)
        .build();
    let mut runner = ScheduleRunner::new();
    assert_eq!(runner.run_minutes(&mut world, 1440), 1440);

    let queued = scenario_states(&world)[0].pending_len() as u64;
    assert!(queued > 0);
    assert_eq!(finalize_day(&mut world), queued);

    let stats = collect_stats(&world);
    let solo = &stats.scenarios[0];
    assert_eq!(solo.end_of_day_cancelled, queued);
    assert_eq!(solo.cancelled_count, queued);
    assert_eq!(solo.total_requests, 1440);
    assert_eq!(solo.serviced_count + solo.cancelled_count, solo.total_requests);
}

#[test]
fn certain_cancellation_caps_waits_at_the_timeout() {
    let timeout = 5;
    let mut world = TestWorldBuilder::single_block(2, 1000.0)
        .with_timeout(timeout)
        .with_cancel_probability(1.0)
        .build();
    let mut runner = ScheduleRunner::new();
    assert_eq!(runner.run_minutes(&mut world, 1440), 1440);

    // Only requests younger than the timeout can still be queued.
    let queued = scenario_states(&world)[0].pending_len() as u64;
    assert!(queued <= u64::from(timeout));
    assert_eq!(finalize_day(&mut world), queued);

    let stats = collect_stats(&world);
    let solo = &stats.scenarios[0];
    assert!(solo.serviced_count > 0);
    assert!(solo.wait_time_samples.iter().all(|&w| w <= timeout));
    assert_eq!(solo.end_of_day_cancelled, queued);
}

#[test]
fn requests_surviving_the_cancel_draw_wait_past_the_timeout() {
    let timeout = 3;
    let mut world = TestWorldBuilder::single_block(1, 1440.0)
        .with_seed(9)
        .with_timeout(timeout)
        .with_cancel_probability(0.5)
        .build();
    ScheduleRunner::new().run_full(&mut world).unwrap();

    let stats = collect_stats(&world);
    let solo = &stats.scenarios[0];
    let late = solo
        .wait_time_samples
        .iter()
        .filter(|&&w| w > timeout)
        .count();
    assert!(late > 0, "no serviced request waited past the timeout");
    assert!(solo.cancelled_count > solo.end_of_day_cancelled);
    // Waits are only recorded on service, so every late wait belongs to a served ride.
    assert_eq!(solo.wait_time_samples.len() as u64, solo.serviced_count);
    assert_eq!(solo.serviced_count + solo.cancelled_count, solo.total_requests);
}

#[test]
fn zero_arrivals_leave_every_counter_at_zero() {
    let mut world = TestWorldBuilder::single_block(5, 0.0).build();
    let ticks = ScheduleRunner::new().run_full(&mut world).unwrap();
    assert_eq!(ticks, 1440);

    let stats = collect_stats(&world);
    let solo = &stats.scenarios[0];
    assert_eq!(solo.total_requests, 0);
    assert_eq!(solo.serviced_count, 0);
    assert_eq!(solo.cancelled_count, 0);
    assert!(solo.wait_time_samples.is_empty());
    assert!(solo.completed_ride_distances.is_empty());
}

#[test]
fn served_rides_record_distance_and_kind() {
    let mut world = TestWorldBuilder::new().with_seed(5).build();
    ScheduleRunner::new().run_full(&mut world).unwrap();

    for scenario in collect_stats(&world).scenarios {
        assert_eq!(
            scenario.wait_time_samples.len() as u64,
            scenario.serviced_count
        );
        assert_eq!(
            scenario.completed_ride_distances.len() as u64,
            scenario.serviced_count
        );
        let rides: u64 = scenario.rides_by_kind.values().sum();
        assert_eq!(rides, scenario.serviced_count);
        assert!(scenario.completed_ride_distances.iter().all(|&d| d > 0.0));
    }
}
