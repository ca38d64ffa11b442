//! Results aggregation: folds recorded scenario counters into rates, wait
//! statistics and ride value. Nothing here mutates simulation state.

use std::fmt;

use serde::Serialize;

use crate::ecs::ScenarioStats;
use crate::pricing::PricingConfig;
use crate::runner::SimulationStats;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub total_requests: u64,
    pub serviced_count: u64,
    pub cancelled_count: u64,
    pub end_of_day_cancelled: u64,
    /// serviced / total, 0 when nothing was requested.
    pub success_rate: f64,
    /// cancelled / total, 0 when nothing was requested.
    pub cancellation_rate: f64,
    pub avg_wait_minutes: f64,
    pub median_wait_minutes: f64,
    pub p90_wait_minutes: f64,
    pub max_wait_minutes: u32,
    pub total_distance_km: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReport {
    pub seed: u64,
    pub day_length_minutes: u32,
    pub scenarios: Vec<ScenarioSummary>,
    /// Sum of every scenario's ride value.
    pub total_value: f64,
}

/// Build the report for a finished run. Calling it again on the same stats
/// yields an identical report.
pub fn summarize(stats: &SimulationStats, pricing: &PricingConfig) -> DispatchReport {
    let scenarios: Vec<ScenarioSummary> = stats
        .scenarios
        .iter()
        .map(|scenario| summarize_scenario(scenario, pricing))
        .collect();
    let total_value = scenarios.iter().map(|s| s.total_value).sum();
    DispatchReport {
        seed: stats.seed,
        day_length_minutes: stats.day_length_minutes,
        scenarios,
        total_value,
    }
}

pub fn summarize_scenario(stats: &ScenarioStats, pricing: &PricingConfig) -> ScenarioSummary {
    let (avg_wait, median_wait, p90_wait) = wait_stats(&stats.wait_time_samples);
    ScenarioSummary {
        name: stats.name.clone(),
        total_requests: stats.total_requests,
        serviced_count: stats.serviced_count,
        cancelled_count: stats.cancelled_count,
        end_of_day_cancelled: stats.end_of_day_cancelled,
        success_rate: rate(stats.serviced_count, stats.total_requests),
        cancellation_rate: rate(stats.cancelled_count, stats.total_requests),
        avg_wait_minutes: avg_wait,
        median_wait_minutes: median_wait,
        p90_wait_minutes: p90_wait,
        max_wait_minutes: stats.wait_time_samples.iter().copied().max().unwrap_or(0),
        total_distance_km: stats.completed_ride_distances.iter().sum(),
        total_value: pricing.total_value(&stats.completed_ride_distances),
    }
}

fn rate(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Mean, median and p90 of wait samples; zeros when there are none.
pub fn wait_stats(samples: &[u32]) -> (f64, f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable();

    let avg = sorted.iter().map(|&w| f64::from(w)).sum::<f64>() / sorted.len() as f64;
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0
    } else {
        f64::from(sorted[mid])
    };
    // floor(0.9 * (n - 1))
    let p90_idx = ((sorted.len() - 1) as f64 * 0.9) as usize;
    let p90 = f64::from(sorted[p90_idx.min(sorted.len() - 1)]);

    (avg, median, p90)
}

impl fmt::Display for ScenarioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario: {}", self.name)?;
        writeln!(f, "  Total requests:      {}", self.total_requests)?;
        writeln!(
            f,
            "  Serviced:            {} ({:.1}%)",
            self.serviced_count,
            self.success_rate * 100.0
        )?;
        writeln!(
            f,
            "  Cancelled:           {} ({:.1}%, {} at end of day)",
            self.cancelled_count,
            self.cancellation_rate * 100.0,
            self.end_of_day_cancelled
        )?;
        writeln!(
            f,
            "  Wait (min):          avg {:.2}, median {:.1}, p90 {:.1}, max {}",
            self.avg_wait_minutes,
            self.median_wait_minutes,
            self.p90_wait_minutes,
            self.max_wait_minutes
        )?;
        writeln!(f, "  Distance ridden:     {:.1} km", self.total_distance_km)?;
        write!(f, "  Ride value:          {:.2}", self.total_value)
    }
}

impl fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Dispatch results (seed {}, {} minutes)",
            self.seed, self.day_length_minutes
        )?;
        for scenario in &self.scenarios {
            writeln!(f)?;
            writeln!(f, "{scenario}")?;
        }
        writeln!(f)?;
        let requests: u64 = self.scenarios.iter().map(|s| s.total_requests).sum();
        let serviced: u64 = self.scenarios.iter().map(|s| s.serviced_count).sum();
        let cancelled: u64 = self.scenarios.iter().map(|s| s.cancelled_count).sum();
        writeln!(
            f,
            "Totals: {requests} requests, {serviced} serviced, {cancelled} cancelled"
        )?;
        write!(f, "Total ride value: {:.2}", self.total_value)
    }
}
