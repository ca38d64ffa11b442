#![allow(dead_code)]

use bevy_ecs::prelude::World;
use mobility_core::city::OdMatrix;
use mobility_core::demand::DemandTable;
use mobility_core::scenario::{build_scenario, build_scenario_with_factory, DispatchParams};
use mobility_core::test_helpers::whole_day_table;
use mobility_core::traffic::TrafficModel;
use mobility_core::trip::{FleetMix, TripFactory};

/// Builder for reproducible dispatch worlds.
#[derive(Debug, Clone)]
pub struct TestWorldBuilder {
    params: DispatchParams,
    od_matrix: Option<OdMatrix>,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorldBuilder {
    /// Default run parameters with a fixed seed.
    pub fn new() -> Self {
        Self {
            params: DispatchParams::default().with_seed(42),
            od_matrix: None,
        }
    }

    /// A single scenario named `solo` whose only block covers the whole day.
    pub fn single_block(riders: u32, arrivals_per_day: f64) -> Self {
        Self::new()
            .with_scenarios(["solo"])
            .with_demand(whole_day_table(riders, &[("solo", arrivals_per_day)]))
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params = self.params.with_seed(seed);
        self
    }

    pub fn with_day_length(mut self, minutes: u32) -> Self {
        self.params = self.params.with_day_length_minutes(minutes);
        self
    }

    pub fn with_timeout(mut self, minutes: u32) -> Self {
        self.params = self.params.with_timeout_minutes(minutes);
        self
    }

    pub fn with_cancel_probability(mut self, probability: f64) -> Self {
        self.params = self.params.with_cancel_probability(probability);
        self
    }

    pub fn with_scenarios<const N: usize>(mut self, scenarios: [&str; N]) -> Self {
        self.params = self.params.with_scenarios(scenarios);
        self
    }

    pub fn with_demand(mut self, demand: DemandTable) -> Self {
        self.params = self.params.with_demand(demand);
        self
    }

    pub fn with_fleet_mix(mut self, fleet_mix: FleetMix) -> Self {
        self.params = self.params.with_fleet_mix(fleet_mix);
        self
    }

    pub fn with_snapshot_interval(mut self, interval: Option<u32>) -> Self {
        self.params = self.params.with_snapshot_interval_minutes(interval);
        self
    }

    /// Draw trips from this matrix instead of the Eindhoven one.
    pub fn with_od_matrix(mut self, matrix: OdMatrix) -> Self {
        self.od_matrix = Some(matrix);
        self
    }

    pub fn params(&self) -> &DispatchParams {
        &self.params
    }

    pub fn build(self) -> World {
        let mut world = World::new();
        match self.od_matrix {
            Some(matrix) => {
                let factory = TripFactory::new(
                    Box::new(matrix),
                    TrafficModel::default(),
                    self.params.fleet_mix,
                );
                build_scenario_with_factory(&mut world, &self.params, factory)
                    .expect("test params are valid");
            }
            None => build_scenario(&mut world, &self.params).expect("test params are valid"),
        }
        world
    }
}
