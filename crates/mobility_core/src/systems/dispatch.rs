//! Per-minute dispatch: arrival, capacity refresh, FIFO service, timeout sweep.
//!
//! The steps run in exactly that order for each scenario, and scenarios run in
//! [`ScenarioOrder`]. Each step is a plain function over [`ScenarioState`] so
//! it can be driven without a world.

use bevy_ecs::prelude::{Query, Res, ResMut};
use rand::Rng;
use tracing::debug;

use crate::clock::{format_hhmm, SimulationClock};
use crate::demand::{BlockId, DemandSchedule};
use crate::ecs::{
    CurrentBlock, GenerationFault, QueuedRequest, ScenarioOrder, ScenarioState, SimRng,
};
use crate::error::SimulationError;
use crate::scenario::DispatchConfig;
use crate::trip::{TripError, TripFactory, TripRequest};

/// What happened to one scenario during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub arrived: bool,
    pub available: u32,
    pub serviced: u32,
    pub cancelled: u32,
}

/// Step 1: one Bernoulli draw; on success the factory builds a request that
/// joins the tail of the queue.
pub fn arrive<R: Rng>(
    state: &mut ScenarioState,
    now: u32,
    arrival_probability: f64,
    factory: &TripFactory,
    rng: &mut R,
) -> Result<bool, TripError> {
    if rng.gen::<f64>() >= arrival_probability {
        return Ok(false);
    }
    let request = factory.generate(rng, now)?;
    debug!(
        scenario = %state.name,
        minute = now,
        origin = request.origin(),
        destination = request.destination(),
        duration = request.duration_minutes(),
        "trip requested"
    );
    enqueue(state, now, request);
    Ok(true)
}

/// Append an already built request to the queue.
pub fn enqueue(state: &mut ScenarioState, arrival_minute: u32, request: TripRequest) {
    state.pending.push_back(QueuedRequest {
        arrival_minute,
        request,
    });
    state.stats.total_requests += 1;
}

/// Step 2: free every marker of `block` that expires at or before `now` and
/// return the number of vehicles available this minute.
pub fn refresh_capacity(state: &mut ScenarioState, now: u32, block: BlockId, riders: u32) -> u32 {
    let markers = &mut state.busy_until_by_block[block.0];
    markers.retain(|&free_at| free_at > now);
    riders.saturating_sub(markers.len() as u32)
}

/// Step 3: serve the oldest requests first, up to `available`.
pub fn serve(state: &mut ScenarioState, now: u32, block: BlockId, available: u32) -> u32 {
    let mut serviced = 0;
    while serviced < available {
        let Some(queued) = state.pending.pop_front() else {
            break;
        };
        let wait = now - queued.arrival_minute;
        let request = &queued.request;
        state.stats.wait_time_samples.push(wait);
        state.stats.serviced_count += 1;
        state
            .stats
            .completed_ride_distances
            .push(request.distance_km());
        *state
            .stats
            .rides_by_kind
            .entry(request.vehicle_kind())
            .or_default() += 1;
        state.busy_until_by_block[block.0].push(now.saturating_add(request.duration_minutes()));
        serviced += 1;
        debug!(
            scenario = %state.name,
            minute = now,
            wait,
            duration = request.duration_minutes(),
            "trip serviced at {}",
            format_hhmm(now)
        );
    }
    serviced
}

/// Step 4: every request that has waited at least `timeout_minutes` faces one
/// cancellation draw; survivors and younger requests keep their place.
pub fn sweep_timeouts<R: Rng>(
    state: &mut ScenarioState,
    now: u32,
    timeout_minutes: u32,
    cancel_probability: f64,
    rng: &mut R,
) -> u32 {
    let mut cancelled = 0;
    let queued = std::mem::take(&mut state.pending);
    for request in queued {
        let wait = now - request.arrival_minute;
        if wait >= timeout_minutes && rng.gen::<f64>() < cancel_probability {
            cancelled += 1;
            debug!(scenario = %state.name, minute = now, wait, "trip cancelled");
            continue;
        }
        state.pending.push_back(request);
    }
    state.stats.cancelled_count += u64::from(cancelled);
    cancelled
}

/// Runs the four steps for one scenario.
#[allow(clippy::too_many_arguments)]
pub fn tick<R: Rng>(
    state: &mut ScenarioState,
    now: u32,
    block: BlockId,
    riders: u32,
    arrival_probability: f64,
    config: &DispatchConfig,
    factory: &TripFactory,
    rng: &mut R,
) -> Result<TickOutcome, TripError> {
    let arrived = arrive(state, now, arrival_probability, factory, rng)?;
    let available = refresh_capacity(state, now, block, riders);
    let serviced = serve(state, now, block, available);
    let cancelled = sweep_timeouts(
        state,
        now,
        config.timeout_minutes,
        config.cancel_probability,
        rng,
    );
    debug_assert!(state.is_balanced(), "request accounting out of balance");
    Ok(TickOutcome {
        arrived,
        available,
        serviced,
        cancelled,
    })
}

/// End of day: everything still queued is cancelled without a draw.
pub fn finalize(state: &mut ScenarioState) -> u64 {
    let remaining = state.pending.len() as u64;
    for queued in state.pending.drain(..) {
        debug!(
            scenario = %state.name,
            arrival = queued.arrival_minute,
            "trip cancelled at end of day"
        );
    }
    state.stats.cancelled_count += remaining;
    state.stats.end_of_day_cancelled += remaining;
    remaining
}

#[allow(clippy::too_many_arguments)]
pub fn dispatch_system(
    clock: Res<SimulationClock>,
    block: Res<CurrentBlock>,
    demand: Res<DemandSchedule>,
    config: Res<DispatchConfig>,
    factory: Res<TripFactory>,
    mut rng: ResMut<SimRng>,
    mut fault: ResMut<GenerationFault>,
    mut scenarios: Query<(&ScenarioOrder, &mut ScenarioState)>,
) {
    if fault.0.is_some() {
        return;
    }
    let now = clock.now();
    let block_id = block.0;
    let active = demand.block(block_id);

    let mut ordered: Vec<_> = scenarios.iter_mut().collect();
    ordered.sort_by_key(|(order, _)| order.0);

    for (order, mut state) in ordered {
        let outcome = tick(
            &mut state,
            now,
            block_id,
            active.riders,
            active.arrival_probability(order.0),
            &config,
            &factory,
            &mut rng.0,
        );
        match outcome {
            Ok(outcome) => debug!(
                scenario = %state.name,
                minute = now,
                arrived = outcome.arrived,
                available = outcome.available,
                serviced = outcome.serviced,
                cancelled = outcome.cancelled,
                "tick"
            ),
            Err(source) => {
                fault.0 = Some(SimulationError::TripGeneration {
                    minute: now,
                    scenario: state.name.clone(),
                    source,
                });
                return;
            }
        }
    }
}
