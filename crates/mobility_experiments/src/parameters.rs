//! Parameter variation for dispatch experiments.
//!
//! A [`ParameterSpace`] is a grid over queue behavior (timeout, cancellation
//! probability), fleet mix and seeds. Every combination becomes one
//! [`ParameterSet`], run independently.

use mobility_core::scenario::DispatchParams;
use mobility_core::trip::FleetMix;

/// One run of the grid.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    pub params: DispatchParams,
    /// Identifies the parameter combination; shared by all its seeds.
    pub experiment_id: String,
    /// Position of this run within the sweep.
    pub run_id: usize,
    pub seed: u64,
}

impl ParameterSet {
    pub fn new(params: DispatchParams, experiment_id: String, run_id: usize, seed: u64) -> Self {
        Self {
            params: params.with_seed(seed),
            experiment_id,
            run_id,
            seed,
        }
    }
}

/// Grid of values to explore. Empty dimensions fall back to the base params.
#[derive(Debug, Clone, Default)]
pub struct ParameterSpace {
    base: DispatchParams,
    timeout_minutes: Vec<u32>,
    cancel_probabilities: Vec<f64>,
    fleet_mixes: Vec<FleetMix>,
    seeds: Vec<u64>,
}

impl ParameterSpace {
    pub fn grid() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, base: DispatchParams) -> Self {
        self.base = base;
        self
    }

    pub fn timeout_minutes(mut self, values: Vec<u32>) -> Self {
        self.timeout_minutes = values;
        self
    }

    pub fn cancel_probabilities(mut self, values: Vec<f64>) -> Self {
        self.cancel_probabilities = values;
        self
    }

    pub fn fleet_mixes(mut self, values: Vec<FleetMix>) -> Self {
        self.fleet_mixes = values;
        self
    }

    pub fn seeds(mut self, values: Vec<u64>) -> Self {
        self.seeds = values;
        self
    }

    /// `count` consecutive seeds starting at `first`.
    pub fn seed_range(self, first: u64, count: usize) -> Self {
        let seeds = (0..count as u64).map(|i| first.wrapping_add(i)).collect();
        self.seeds(seeds)
    }

    /// Every combination, seeds innermost. Run ids follow the returned order.
    pub fn generate(&self) -> Vec<ParameterSet> {
        let timeouts = or_base(&self.timeout_minutes, self.base.timeout_minutes);
        let cancels = or_base(&self.cancel_probabilities, self.base.cancel_probability);
        let mixes = or_base(&self.fleet_mixes, self.base.fleet_mix);
        let seeds = or_base(&self.seeds, self.base.seed);

        let mut sets = Vec::with_capacity(timeouts.len() * cancels.len() * mixes.len() * seeds.len());
        for &timeout in &timeouts {
            for &cancel in &cancels {
                for &mix in &mixes {
                    let experiment_id = format!("t{timeout}_c{cancel}_{}", fleet_mix_label(mix));
                    let params = self
                        .base
                        .clone()
                        .with_timeout_minutes(timeout)
                        .with_cancel_probability(cancel)
                        .with_fleet_mix(mix);
                    for &seed in &seeds {
                        let run_id = sets.len();
                        sets.push(ParameterSet::new(
                            params.clone(),
                            experiment_id.clone(),
                            run_id,
                            seed,
                        ));
                    }
                }
            }
        }
        sets
    }
}

fn or_base<T: Copy>(values: &[T], base: T) -> Vec<T> {
    if values.is_empty() {
        vec![base]
    } else {
        values.to_vec()
    }
}

pub fn fleet_mix_label(mix: FleetMix) -> String {
    match mix {
        FleetMix::Single(kind) => kind.name().to_lowercase(),
        FleetMix::Uniform => "uniform".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobility_core::vehicle::VehicleKind;

    #[test]
    fn empty_space_is_one_default_run() {
        let sets = ParameterSpace::grid().generate();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].seed, 42);
        assert_eq!(sets[0].params.timeout_minutes, 5);
        assert_eq!(sets[0].experiment_id, "t5_c0.8_bike");
    }

    #[test]
    fn grid_is_the_cartesian_product() {
        let sets = ParameterSpace::grid()
            .timeout_minutes(vec![3, 5])
            .cancel_probabilities(vec![0.2, 0.8, 1.0])
            .fleet_mixes(vec![FleetMix::Single(VehicleKind::Car), FleetMix::Uniform])
            .seed_range(10, 4)
            .generate();
        assert_eq!(sets.len(), 2 * 3 * 2 * 4);
        assert!(sets.iter().enumerate().all(|(i, s)| s.run_id == i));
        assert_eq!(
            sets[..4].iter().map(|s| s.seed).collect::<Vec<_>>(),
            vec![10, 11, 12, 13]
        );
        assert!(sets[..4].iter().all(|s| s.experiment_id == "t3_c0.2_car"));
        assert!(sets.iter().all(|s| s.params.seed == s.seed));
        assert_eq!(sets.last().map(|s| s.experiment_id.as_str()), Some("t5_c1_uniform"));
    }
}
