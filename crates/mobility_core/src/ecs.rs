use std::collections::{BTreeMap, VecDeque};

use bevy_ecs::prelude::{Component, Resource};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::demand::BlockId;
use crate::error::SimulationError;
use crate::trip::TripRequest;
use crate::vehicle::VehicleKind;

/// Position of a scenario in the configured scenario list. Scenarios are
/// processed in this order every tick so random draws happen in a fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Component)]
pub struct ScenarioOrder(pub usize);

/// A request waiting for a vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedRequest {
    pub arrival_minute: u32,
    pub request: TripRequest,
}

/// Running counters for one scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioStats {
    pub name: String,
    pub total_requests: u64,
    pub serviced_count: u64,
    /// All cancellations, timed-out and end-of-day.
    pub cancelled_count: u64,
    /// Requests still queued when the day ended.
    pub end_of_day_cancelled: u64,
    /// Service minute minus arrival minute, in service order.
    pub wait_time_samples: Vec<u32>,
    /// Distance of every serviced ride, in service order.
    pub completed_ride_distances: Vec<f64>,
    pub rides_by_kind: BTreeMap<VehicleKind, u64>,
}

/// Queue, busy markers and counters of one demand scenario.
#[derive(Debug, Clone, Component)]
pub struct ScenarioState {
    pub name: String,
    /// FIFO by arrival.
    pub pending: VecDeque<QueuedRequest>,
    /// Per demand block: minutes at which a busy vehicle becomes free again.
    pub busy_until_by_block: Vec<Vec<u32>>,
    pub stats: ScenarioStats,
}

impl ScenarioState {
    /// Creates the busy-marker container of every block upfront.
    pub fn new(name: impl Into<String>, block_count: usize) -> Self {
        let name = name.into();
        Self {
            stats: ScenarioStats {
                name: name.clone(),
                ..Default::default()
            },
            name,
            pending: VecDeque::new(),
            busy_until_by_block: vec![Vec::new(); block_count],
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn busy_count(&self, block: BlockId) -> usize {
        self.busy_until_by_block
            .get(block.0)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// `serviced + cancelled + pending == total`
    pub fn is_balanced(&self) -> bool {
        self.stats.serviced_count + self.stats.cancelled_count + self.pending.len() as u64
            == self.stats.total_requests
    }
}

/// The run's only random source.
#[derive(Debug, Resource)]
pub struct SimRng(pub StdRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Demand block active during the current tick.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentBlock(pub BlockId);

/// Set by the dispatch system when a request cannot be synthesized; the
/// runner stops the run and returns it.
#[derive(Debug, Default, Resource)]
pub struct GenerationFault(pub Option<SimulationError>);
