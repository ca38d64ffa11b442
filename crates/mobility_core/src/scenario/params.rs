use bevy_ecs::prelude::Resource;

use crate::clock::MINUTES_PER_DAY;
use crate::demand::DemandTable;
use crate::error::ConfigError;
use crate::traffic::TrafficModel;
use crate::trip::FleetMix;

/// Minutes a request may wait before it can be cancelled.
pub const DEFAULT_TIMEOUT_MINUTES: u32 = 5;

/// Chance that a timed-out request cancels on each tick it stays queued.
pub const DEFAULT_CANCEL_PROBABILITY: f64 = 0.8;

pub const DEFAULT_SEED: u64 = 42;

/// Minutes between telemetry snapshots.
pub const DEFAULT_SNAPSHOT_INTERVAL_MINUTES: u32 = 60;

pub const DEFAULT_SCENARIOS: [&str; 3] = ["optimistic", "moderate", "pessimistic"];

/// Queue behavior shared by every scenario in a run.
#[derive(Debug, Clone, Copy, Resource)]
pub struct DispatchConfig {
    pub seed: u64,
    pub timeout_minutes: u32,
    pub cancel_probability: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            cancel_probability: DEFAULT_CANCEL_PROBABILITY,
        }
    }
}

/// Telemetry snapshot cadence. `None` disables capture.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SnapshotConfig {
    pub interval_minutes: Option<u32>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            interval_minutes: Some(DEFAULT_SNAPSHOT_INTERVAL_MINUTES),
        }
    }
}

/// Parameters for building a dispatch run.
#[derive(Debug, Clone)]
pub struct DispatchParams {
    pub seed: u64,
    /// Number of minutes to simulate, starting at 00:00. At most one day.
    pub day_length_minutes: u32,
    pub timeout_minutes: u32,
    pub cancel_probability: f64,
    /// Scenario names; each must have an arrival count in every demand block.
    pub scenarios: Vec<String>,
    pub fleet_mix: FleetMix,
    pub traffic: TrafficModel,
    pub demand: DemandTable,
    pub snapshot_interval_minutes: Option<u32>,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            day_length_minutes: MINUTES_PER_DAY,
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            cancel_probability: DEFAULT_CANCEL_PROBABILITY,
            scenarios: DEFAULT_SCENARIOS.iter().map(|s| s.to_string()).collect(),
            fleet_mix: FleetMix::default(),
            traffic: TrafficModel::default(),
            demand: DemandTable::default_day(),
            snapshot_interval_minutes: Some(DEFAULT_SNAPSHOT_INTERVAL_MINUTES),
        }
    }
}

impl DispatchParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_day_length_minutes(mut self, minutes: u32) -> Self {
        self.day_length_minutes = minutes;
        self
    }

    /// Set the wait (minutes) after which queued requests face the cancellation draw.
    pub fn with_timeout_minutes(mut self, minutes: u32) -> Self {
        self.timeout_minutes = minutes;
        self
    }

    pub fn with_cancel_probability(mut self, probability: f64) -> Self {
        self.cancel_probability = probability;
        self
    }

    pub fn with_scenarios<S: Into<String>>(mut self, scenarios: impl IntoIterator<Item = S>) -> Self {
        self.scenarios = scenarios.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fleet_mix(mut self, fleet_mix: FleetMix) -> Self {
        self.fleet_mix = fleet_mix;
        self
    }

    pub fn with_traffic(mut self, traffic: TrafficModel) -> Self {
        self.traffic = traffic;
        self
    }

    pub fn with_demand(mut self, demand: DemandTable) -> Self {
        self.demand = demand;
        self
    }

    pub fn with_snapshot_interval_minutes(mut self, interval: Option<u32>) -> Self {
        self.snapshot_interval_minutes = interval;
        self
    }

    /// Checks that do not depend on the demand table contents.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.day_length_minutes == 0 || self.day_length_minutes > MINUTES_PER_DAY {
            return Err(ConfigError::InvalidDayLength(self.day_length_minutes));
        }
        if !(0.0..=1.0).contains(&self.cancel_probability) {
            return Err(ConfigError::InvalidProbability {
                name: "cancel_probability",
                value: self.cancel_probability,
            });
        }
        if self.scenarios.is_empty() {
            return Err(ConfigError::NoScenarios);
        }
        Ok(())
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            seed: self.seed,
            timeout_minutes: self.timeout_minutes,
            cancel_probability: self.cancel_probability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let params = DispatchParams::default();
        assert_eq!(params.day_length_minutes, 1440);
        assert_eq!(params.timeout_minutes, 5);
        assert_eq!(params.cancel_probability, 0.8);
        assert_eq!(params.scenarios.len(), 3);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            DispatchParams::default().with_day_length_minutes(0).validate(),
            Err(ConfigError::InvalidDayLength(0))
        ));
        assert!(matches!(
            DispatchParams::default()
                .with_day_length_minutes(2000)
                .validate(),
            Err(ConfigError::InvalidDayLength(2000))
        ));
        assert!(matches!(
            DispatchParams::default()
                .with_cancel_probability(1.5)
                .validate(),
            Err(ConfigError::InvalidProbability { .. })
        ));
        assert!(matches!(
            DispatchParams::default()
                .with_scenarios(Vec::<String>::new())
                .validate(),
            Err(ConfigError::NoScenarios)
        ));
    }
}
