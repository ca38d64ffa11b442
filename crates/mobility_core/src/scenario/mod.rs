//! Scenario setup: dispatch parameters and world construction.

mod build;
mod params;

pub use build::{build_scenario, build_scenario_with_factory};
pub use params::{
    DispatchConfig, DispatchParams, SnapshotConfig, DEFAULT_CANCEL_PROBABILITY,
    DEFAULT_SCENARIOS, DEFAULT_SEED, DEFAULT_SNAPSHOT_INTERVAL_MINUTES, DEFAULT_TIMEOUT_MINUTES,
};
