use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::SimulationClock;
use crate::demand::DemandSchedule;
use crate::ecs::{CurrentBlock, ScenarioOrder, ScenarioState};
use crate::scenario::SnapshotConfig;
use crate::telemetry::{DispatchTelemetry, TickSnapshot};

/// Run condition: the snapshot interval has elapsed since the last capture.
pub fn should_capture_snapshot(
    clock: Option<Res<SimulationClock>>,
    config: Option<Res<SnapshotConfig>>,
    telemetry: Option<Res<DispatchTelemetry>>,
) -> bool {
    let (Some(clock), Some(config), Some(telemetry)) = (clock, config, telemetry) else {
        return false;
    };
    let Some(interval) = config.interval_minutes else {
        return false;
    };
    match telemetry.last_snapshot_at {
        None => true,
        Some(last) => clock.now().saturating_sub(last) >= interval.max(1),
    }
}

pub fn capture_snapshot_system(
    clock: Res<SimulationClock>,
    block: Res<CurrentBlock>,
    demand: Res<DemandSchedule>,
    mut telemetry: ResMut<DispatchTelemetry>,
    scenarios: Query<(&ScenarioOrder, &ScenarioState)>,
) {
    let now = clock.now();
    let block_name = &demand.block(block.0).name;

    let mut ordered: Vec<_> = scenarios.iter().collect();
    ordered.sort_by_key(|(order, _)| order.0);

    for (_, state) in ordered {
        telemetry.snapshots.push(TickSnapshot {
            minute: now,
            block: block_name.clone(),
            scenario: state.name.clone(),
            pending: state.pending_len(),
            busy: state.busy_count(block.0),
            total_requests: state.stats.total_requests,
            serviced_count: state.stats.serviced_count,
            cancelled_count: state.stats.cancelled_count,
        });
    }
    telemetry.last_snapshot_at = Some(now);
}
