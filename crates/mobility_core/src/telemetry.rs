//! Telemetry: periodic per-scenario snapshots of queue and fleet state.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

/// Queue and fleet state of one scenario at one minute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSnapshot {
    pub minute: u32,
    pub block: String,
    pub scenario: String,
    pub pending: usize,
    /// Vehicles of the active block still busy after this tick's dispatch.
    pub busy: usize,
    pub total_requests: u64,
    pub serviced_count: u64,
    pub cancelled_count: u64,
}

/// Snapshots captured during a run. Capture cadence comes from
/// [`crate::scenario::SnapshotConfig`].
#[derive(Debug, Default, Resource)]
pub struct DispatchTelemetry {
    pub snapshots: Vec<TickSnapshot>,
    pub last_snapshot_at: Option<u32>,
}

impl DispatchTelemetry {
    pub fn for_scenario<'a>(&'a self, scenario: &'a str) -> impl Iterator<Item = &'a TickSnapshot> + 'a {
        self.snapshots.iter().filter(move |s| s.scenario == scenario)
    }
}
