//! Flat result rows from completed dispatch runs.

use mobility_core::pricing::PricingConfig;
use mobility_core::report::summarize;
use mobility_core::runner::SimulationStats;
use serde::Serialize;

use crate::parameters::{fleet_mix_label, ParameterSet};

/// Outcome of one demand scenario in one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepResult {
    pub experiment_id: String,
    pub run_id: usize,
    pub seed: u64,
    pub timeout_minutes: u32,
    pub cancel_probability: f64,
    pub fleet_mix: String,
    pub scenario: String,
    pub total_requests: u64,
    pub serviced_count: u64,
    pub cancelled_count: u64,
    pub end_of_day_cancelled: u64,
    pub success_rate: f64,
    pub cancellation_rate: f64,
    pub avg_wait_minutes: f64,
    pub median_wait_minutes: f64,
    pub p90_wait_minutes: f64,
    pub total_value: f64,
}

/// One row per scenario, in scenario order.
pub fn extract_metrics(
    param_set: &ParameterSet,
    stats: &SimulationStats,
    pricing: &PricingConfig,
) -> Vec<SweepResult> {
    let report = summarize(stats, pricing);
    report
        .scenarios
        .into_iter()
        .map(|summary| SweepResult {
            experiment_id: param_set.experiment_id.clone(),
            run_id: param_set.run_id,
            seed: param_set.seed,
            timeout_minutes: param_set.params.timeout_minutes,
            cancel_probability: param_set.params.cancel_probability,
            fleet_mix: fleet_mix_label(param_set.params.fleet_mix),
            scenario: summary.name,
            total_requests: summary.total_requests,
            serviced_count: summary.serviced_count,
            cancelled_count: summary.cancelled_count,
            end_of_day_cancelled: summary.end_of_day_cancelled,
            success_rate: summary.success_rate,
            cancellation_rate: summary.cancellation_rate,
            avg_wait_minutes: summary.avg_wait_minutes,
            median_wait_minutes: summary.median_wait_minutes,
            p90_wait_minutes: summary.p90_wait_minutes,
            total_value: summary.total_value,
        })
        .collect()
}

/// Mean success rate per scenario over a set of rows, in first-seen order.
pub fn mean_success_rate_by_scenario(results: &[SweepResult]) -> Vec<(String, f64)> {
    let mut sums: Vec<(String, f64, usize)> = Vec::new();
    for row in results {
        match sums.iter_mut().find(|(name, _, _)| *name == row.scenario) {
            Some(entry) => {
                entry.1 += row.success_rate;
                entry.2 += 1;
            }
            None => sums.push((row.scenario.clone(), row.success_rate, 1)),
        }
    }
    sums.into_iter()
        .map(|(name, sum, n)| (name, sum / n as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobility_core::ecs::ScenarioStats;
    use mobility_core::scenario::DispatchParams;

    fn stats() -> SimulationStats {
        SimulationStats {
            seed: 4,
            day_length_minutes: 1440,
            scenarios: vec![
                ScenarioStats {
                    name: "optimistic".to_string(),
                    total_requests: 4,
                    serviced_count: 3,
                    cancelled_count: 1,
                    wait_time_samples: vec![0, 1, 5],
                    completed_ride_distances: vec![2.0, 2.0, 1.0],
                    ..Default::default()
                },
                ScenarioStats {
                    name: "pessimistic".to_string(),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn one_row_per_scenario() {
        let set = ParameterSet::new(DispatchParams::default(), "exp".to_string(), 7, 4);
        let rows = extract_metrics(&set, &stats(), &PricingConfig::default());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].scenario, "optimistic");
        assert_eq!(rows[0].run_id, 7);
        assert_eq!(rows[0].fleet_mix, "bike");
        assert!((rows[0].success_rate - 0.75).abs() < 1e-9);
        assert!((rows[0].median_wait_minutes - 1.0).abs() < 1e-9);
        // 3 × 1.5 + 5 km × 0.2
        assert!((rows[0].total_value - 5.5).abs() < 1e-9);
        assert_eq!(rows[1].success_rate, 0.0);
    }

    #[test]
    fn mean_success_rate_groups_by_scenario() {
        let set = ParameterSet::new(DispatchParams::default(), "exp".to_string(), 0, 4);
        let mut rows = extract_metrics(&set, &stats(), &PricingConfig::default());
        rows.extend(extract_metrics(&set, &stats(), &PricingConfig::default()));
        let means = mean_success_rate_by_scenario(&rows);
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].0, "optimistic");
        assert!((means[0].1 - 0.75).abs() < 1e-9);
        assert_eq!(means[1].1, 0.0);
    }
}
