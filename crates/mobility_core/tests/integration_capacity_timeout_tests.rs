mod support;

use mobility_core::demand::BlockId;
use mobility_core::ecs::ScenarioState;
use mobility_core::runner::{collect_stats, scenario_states};
use mobility_core::systems::dispatch::{enqueue, refresh_capacity, serve, sweep_timeouts};
use mobility_core::test_helpers::test_request;
use rand::rngs::StdRng;
use rand::SeedableRng;
use support::schedule::ScheduleRunner;
use support::world::TestWorldBuilder;

/// Capacity 1, timeout 5, cancel probability 1.0; two requests in the same
/// minute, the first taking 10 minutes to ride.
#[test]
fn second_request_is_cancelled_after_the_timeout() {
    let block = BlockId(0);
    let mut state = ScenarioState::new("solo", 1);
    let mut rng = StdRng::seed_from_u64(0);
    enqueue(&mut state, 0, test_request(0, 10));
    enqueue(&mut state, 0, test_request(0, 10));

    for now in 0..=5 {
        let available = refresh_capacity(&mut state, now, block, 1);
        serve(&mut state, now, block, available);
        let cancelled = sweep_timeouts(&mut state, now, 5, 1.0, &mut rng);
        assert!(state.is_balanced());

        assert_eq!(state.stats.serviced_count, 1, "minute {now}");
        if now < 5 {
            assert_eq!(cancelled, 0, "minute {now}");
            assert_eq!(state.pending_len(), 1);
        } else {
            assert_eq!(cancelled, 1);
            assert_eq!(state.pending_len(), 0);
        }
    }
    assert_eq!(state.stats.wait_time_samples, vec![0]);
    assert_eq!(state.stats.cancelled_count, 1);
    assert_eq!(state.busy_until_by_block[0], vec![10]);
}

#[test]
fn vehicle_frees_up_at_its_marker_minute() {
    let block = BlockId(0);
    let mut state = ScenarioState::new("solo", 1);
    enqueue(&mut state, 0, test_request(0, 3));
    enqueue(&mut state, 1, test_request(1, 3));

    for now in 0..3 {
        let available = refresh_capacity(&mut state, now, block, 1);
        serve(&mut state, now, block, available);
    }
    assert_eq!(state.stats.serviced_count, 1);

    let available = refresh_capacity(&mut state, 3, block, 1);
    assert_eq!(available, 1);
    serve(&mut state, 3, block, available);
    assert_eq!(state.stats.wait_time_samples, vec![0, 2]);
    assert_eq!(state.busy_until_by_block[0], vec![6]);
}

/// The same situation driven through the schedule: one arrival per minute,
/// one vehicle, every bike ride in the Eindhoven matrix lasts more than 5
/// minutes.
#[test]
fn scheduled_run_cancels_the_queued_request_at_arrival_plus_timeout() {
    let mut world = TestWorldBuilder::single_block(1, 1440.0)
        .with_timeout(5)
        .with_cancel_probability(1.0)
        .with_day_length(7)
        .build();
    let mut runner = ScheduleRunner::new();

    assert!(runner.run_one(&mut world));
    let free_at = scenario_states(&world)[0].busy_until_by_block[0][0];
    assert!(free_at > 6, "first ride must outlast the timeout, frees at {free_at}");

    let mut front_by_minute = Vec::new();
    runner
        .run_full_with_hook(&mut world, |world, minute| {
            let state = scenario_states(world)[0];
            assert_eq!(state.stats.serviced_count, 1, "minute {minute}");
            front_by_minute.push((
                minute,
                state.pending.front().map(|q| q.arrival_minute),
                state.stats.cancelled_count,
            ));
        })
        .unwrap();

    assert_eq!(front_by_minute[4], (5, Some(1), 0));
    assert_eq!(front_by_minute[5], (6, Some(2), 1));

    let stats = collect_stats(&world);
    // Minute 1..=6 arrivals: one timed out, five cancelled at end of day.
    assert_eq!(stats.scenarios[0].total_requests, 7);
    assert_eq!(stats.scenarios[0].end_of_day_cancelled, 5);
}
