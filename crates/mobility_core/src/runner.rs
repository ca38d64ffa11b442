//! Simulation runner: advances the clock and drives the dispatch schedule.
//!
//! Clock progression happens here, outside systems. Each step advances
//! [SimulationClock] by one minute, resolves the active demand block into
//! [CurrentBlock], then runs the schedule. A trip that cannot be synthesized
//! stops the run with [SimulationError::TripGeneration].

use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;
use serde::Serialize;
use tracing::info;

use crate::clock::{format_hhmm, SimulationClock};
use crate::demand::DemandSchedule;
use crate::ecs::{CurrentBlock, GenerationFault, ScenarioOrder, ScenarioState, ScenarioStats};
use crate::error::SimulationError;
use crate::scenario::{build_scenario, DispatchConfig, DispatchParams};
use crate::systems::{
    dispatch::{dispatch_system, finalize},
    telemetry_snapshot::{capture_snapshot_system, should_capture_snapshot},
};

/// Final per-scenario counters of one run, in scenario order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationStats {
    pub seed: u64,
    pub day_length_minutes: u32,
    pub scenarios: Vec<ScenarioStats>,
}

impl SimulationStats {
    pub fn scenario(&self, name: &str) -> Option<&ScenarioStats> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}

/// Dispatch for every scenario, then a snapshot when the interval has elapsed.
pub fn dispatch_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            dispatch_system,
            capture_snapshot_system.run_if(should_capture_snapshot),
        )
            .chain(),
    );
    schedule
}

/// Runs one simulated minute. Returns `Ok(false)` once the day is over.
pub fn run_next_tick(world: &mut World, schedule: &mut Schedule) -> Result<bool, SimulationError> {
    let Some(now) = world.resource_mut::<SimulationClock>().advance() else {
        return Ok(false);
    };
    let minute_of_day = world.resource::<SimulationClock>().minute_of_day();
    let block = world.resource::<DemandSchedule>().block_id_for_minute(minute_of_day);
    world.insert_resource(CurrentBlock(block));

    schedule.run(world);

    if let Some(error) = world.resource_mut::<GenerationFault>().0.take() {
        return Err(error);
    }
    if world.resource::<SimulationClock>().is_hour_boundary() {
        log_progress(world, now);
    }
    Ok(true)
}

/// Runs one simulated minute and invokes `hook` with the minute afterwards.
pub fn run_next_tick_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    mut hook: F,
) -> Result<bool, SimulationError>
where
    F: FnMut(&World, u32),
{
    if !run_next_tick(world, schedule)? {
        return Ok(false);
    }
    let now = world.resource::<SimulationClock>().now();
    hook(world, now);
    Ok(true)
}

/// Runs every remaining minute, then force-cancels what is still queued.
/// Returns the number of minutes simulated.
pub fn run_day(world: &mut World, schedule: &mut Schedule) -> Result<u32, SimulationError> {
    run_day_with_hook(world, schedule, |_, _| {})
}

/// [run_day] with a hook after every minute, e.g. for live display or pacing.
/// The hook only sees the world; it cannot change the outcome.
pub fn run_day_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    mut hook: F,
) -> Result<u32, SimulationError>
where
    F: FnMut(&World, u32),
{
    let mut ticks = 0;
    while run_next_tick_with_hook(world, schedule, &mut hook)? {
        ticks += 1;
    }
    finalize_day(world);
    Ok(ticks)
}

/// Cancels every request still queued in any scenario. Returns how many were
/// cancelled; a second call returns 0.
pub fn finalize_day(world: &mut World) -> u64 {
    let mut query = world.query::<&mut ScenarioState>();
    query
        .iter_mut(world)
        .map(|mut state| finalize(&mut state))
        .sum()
}

/// Scenario states in scenario order.
pub fn scenario_states(world: &World) -> Vec<&ScenarioState> {
    let mut states: Vec<(usize, &ScenarioState)> = world
        .iter_entities()
        .filter_map(|entity| {
            let order = entity.get::<ScenarioOrder>()?;
            let state = entity.get::<ScenarioState>()?;
            Some((order.0, state))
        })
        .collect();
    states.sort_by_key(|(order, _)| *order);
    states.into_iter().map(|(_, state)| state).collect()
}

pub fn collect_stats(world: &World) -> SimulationStats {
    SimulationStats {
        seed: world.resource::<DispatchConfig>().seed,
        day_length_minutes: world.resource::<SimulationClock>().day_length(),
        scenarios: scenario_states(world)
            .into_iter()
            .map(|state| state.stats.clone())
            .collect(),
    }
}

/// Builds a world from `params`, simulates the day and returns the counters.
pub fn run_dispatch(params: &DispatchParams) -> Result<SimulationStats, SimulationError> {
    let mut world = World::new();
    build_scenario(&mut world, params)?;
    info!(
        seed = params.seed,
        day_length = params.day_length_minutes,
        scenarios = params.scenarios.len(),
        "dispatch run started"
    );

    let mut schedule = dispatch_schedule();
    run_day(&mut world, &mut schedule)?;

    let stats = collect_stats(&world);
    for scenario in &stats.scenarios {
        info!(
            scenario = %scenario.name,
            total = scenario.total_requests,
            serviced = scenario.serviced_count,
            cancelled = scenario.cancelled_count,
            "dispatch run finished"
        );
    }
    Ok(stats)
}

/// Default run: built-in demand table, default queue behavior.
pub fn run(seed: u64, day_length_minutes: u32) -> Result<SimulationStats, SimulationError> {
    run_dispatch(
        &DispatchParams::default()
            .with_seed(seed)
            .with_day_length_minutes(day_length_minutes),
    )
}

fn log_progress(world: &World, now: u32) {
    let block = world.resource::<CurrentBlock>().0;
    let block_name = &world.resource::<DemandSchedule>().block(block).name;
    let states = scenario_states(world);
    let pending: usize = states.iter().map(|s| s.pending_len()).sum();
    let serviced: u64 = states.iter().map(|s| s.stats.serviced_count).sum();
    info!(block = %block_name, pending, serviced, "simulated time {}", format_hhmm(now));
}
