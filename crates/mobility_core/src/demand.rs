//! Demand schedule: named time-of-day blocks with vehicle capacity and
//! per-scenario arrival rates.
//!
//! The table is read from JSON shaped as
//! `{"time_blocks": {name: {start, end, riders, minutes, <scenario>: count, ...}}}`.
//! A block with `start > end` wraps past midnight. Minutes no block covers
//! fall back to the block named [`FALLBACK_BLOCK`]. Blocks may not overlap.

use std::collections::BTreeMap;
use std::path::Path;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::clock::{parse_hhmm, MINUTES_PER_DAY};
use crate::error::ConfigError;

pub const FALLBACK_BLOCK: &str = "night";

const DEFAULT_DEMAND_JSON: &str = include_str!("../data/daily_demand.json");

/// On-disk form of the demand table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandTable {
    pub time_blocks: BTreeMap<String, DemandBlockSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandBlockSpec {
    pub start: String,
    pub end: String,
    /// Vehicles available while the block is active.
    pub riders: u32,
    /// Length of the block; divides the arrival counts into per-minute probabilities.
    pub minutes: u32,
    /// Expected arrivals over the block, keyed by scenario name.
    #[serde(flatten)]
    pub arrivals: BTreeMap<String, f64>,
}

impl DemandTable {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|error| ConfigError::Json(error.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|error| ConfigError::Io(format!("{}: {error}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// The built-in weekday table with optimistic/moderate/pessimistic scenarios.
    pub fn default_day() -> Self {
        Self::from_json_str(DEFAULT_DEMAND_JSON).expect("embedded demand table is valid JSON")
    }
}

/// Index of a block within a [`DemandSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct DemandBlock {
    pub name: String,
    pub start: u32,
    pub end: u32,
    pub riders: u32,
    pub minutes: u32,
    /// Per-minute Bernoulli probability, one entry per scenario in schedule order.
    arrival_probabilities: Vec<f64>,
}

impl DemandBlock {
    pub fn contains(&self, minute_of_day: u32) -> bool {
        if self.start < self.end {
            self.start <= minute_of_day && minute_of_day < self.end
        } else {
            // Wraps past midnight; start == end covers the whole day.
            minute_of_day >= self.start || minute_of_day < self.end
        }
    }

    pub fn arrival_probability(&self, scenario: usize) -> f64 {
        self.arrival_probabilities
            .get(scenario)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Validated demand table with a precomputed minute → block lookup.
#[derive(Debug, Clone, Resource)]
pub struct DemandSchedule {
    scenarios: Vec<String>,
    blocks: Vec<DemandBlock>,
    minute_blocks: Vec<BlockId>,
}

impl DemandSchedule {
    pub fn new(table: &DemandTable, scenarios: &[String]) -> Result<Self, ConfigError> {
        if scenarios.is_empty() {
            return Err(ConfigError::NoScenarios);
        }
        if table.time_blocks.is_empty() {
            return Err(ConfigError::EmptyTable);
        }

        let mut blocks = Vec::with_capacity(table.time_blocks.len());
        for (name, spec) in &table.time_blocks {
            blocks.push(validate_block(name, spec, scenarios)?);
        }

        let fallback = blocks
            .iter()
            .position(|b| b.name == FALLBACK_BLOCK)
            .map(BlockId);
        let mut minute_blocks = Vec::with_capacity(MINUTES_PER_DAY as usize);
        for minute in 0..MINUTES_PER_DAY {
            let mut covering = blocks.iter().enumerate().filter(|(_, b)| b.contains(minute));
            let first = covering.next().map(|(index, _)| BlockId(index));
            if let (Some(first), Some((_, second))) = (first, covering.next()) {
                return Err(ConfigError::OverlappingBlocks {
                    minute,
                    first: blocks[first.0].name.clone(),
                    second: second.name.clone(),
                });
            }
            let id = first
                .or(fallback)
                .ok_or(ConfigError::UnmappedMinute { minute })?;
            minute_blocks.push(id);
        }

        Ok(Self {
            scenarios: scenarios.to_vec(),
            blocks,
            minute_blocks,
        })
    }

    pub fn scenarios(&self) -> &[String] {
        &self.scenarios
    }

    pub fn blocks(&self) -> &[DemandBlock] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> &DemandBlock {
        &self.blocks[id.0]
    }

    pub fn block_id_for_minute(&self, minute: u32) -> BlockId {
        self.minute_blocks[(minute % MINUTES_PER_DAY) as usize]
    }

    pub fn block_for_minute(&self, minute: u32) -> &DemandBlock {
        self.block(self.block_id_for_minute(minute))
    }

    pub fn block_id(&self, name: &str) -> Option<BlockId> {
        self.blocks.iter().position(|b| b.name == name).map(BlockId)
    }
}

fn validate_block(
    name: &str,
    spec: &DemandBlockSpec,
    scenarios: &[String],
) -> Result<DemandBlock, ConfigError> {
    let parse = |value: &str| {
        parse_hhmm(value).ok_or_else(|| ConfigError::InvalidTime {
            block: name.to_string(),
            value: value.to_string(),
        })
    };
    let start = parse(&spec.start)?;
    let end = parse(&spec.end)?;
    if spec.minutes == 0 {
        return Err(ConfigError::ZeroMinutes {
            block: name.to_string(),
        });
    }

    let mut arrival_probabilities = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let count = *spec
            .arrivals
            .get(scenario)
            .ok_or_else(|| ConfigError::MissingScenario {
                block: name.to_string(),
                scenario: scenario.clone(),
            })?;
        if !count.is_finite() || count < 0.0 {
            return Err(ConfigError::InvalidArrivals {
                block: name.to_string(),
                scenario: scenario.clone(),
                value: count,
            });
        }
        arrival_probabilities.push(count / f64::from(spec.minutes));
    }

    Ok(DemandBlock {
        name: name.to_string(),
        start,
        end,
        riders: spec.riders,
        minutes: spec.minutes,
        arrival_probabilities,
    })
}
