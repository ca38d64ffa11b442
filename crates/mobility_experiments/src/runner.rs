//! Parallel dispatch runs using rayon.
//!
//! Every run owns its world and random source; runs share nothing, so
//! results are identical to running them one after another.

use std::error::Error;

use bevy_ecs::prelude::World;
use indicatif::{ProgressBar, ProgressStyle};
use mobility_core::error::SimulationError;
use mobility_core::pricing::PricingConfig;
use mobility_core::runner::{collect_stats, dispatch_schedule, run_day, SimulationStats};
use mobility_core::scenario::{build_scenario, DispatchParams};
use rayon::prelude::*;
use tracing::info;

use crate::metrics::{extract_metrics, SweepResult};
use crate::parameters::{ParameterSet, ParameterSpace};

/// Run one parameter set to the end of its day.
pub fn run_single_simulation(param_set: &ParameterSet) -> Result<SimulationStats, SimulationError> {
    let mut world = World::new();
    build_scenario(&mut world, &param_set.params)?;
    let mut schedule = dispatch_schedule();
    run_day(&mut world, &mut schedule)?;
    Ok(collect_stats(&world))
}

/// Run every parameter set in parallel and flatten the results into rows,
/// in the order of `parameter_sets`. The first failing run aborts the sweep.
pub fn run_parameter_sweep(
    parameter_sets: &[ParameterSet],
    pricing: &PricingConfig,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<SweepResult>, Box<dyn Error>> {
    let total = parameter_sets.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )?
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    info!(runs = total, threads = pool.current_num_threads(), "sweep started");
    let pb_clone = pb.clone();
    let stats: Result<Vec<SimulationStats>, SimulationError> = pool.install(|| {
        parameter_sets
            .par_iter()
            .map(|param_set| {
                let result = run_single_simulation(param_set);
                if let Some(ref progress_bar) = pb_clone {
                    progress_bar.inc(1);
                }
                result
            })
            .collect()
    });

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    let rows = parameter_sets
        .iter()
        .zip(stats?.iter())
        .flat_map(|(param_set, stats)| extract_metrics(param_set, stats, pricing))
        .collect::<Vec<_>>();
    info!(rows = rows.len(), "sweep finished");
    Ok(rows)
}

/// The same configuration under `count` consecutive seeds starting at `first_seed`.
pub fn run_seed_sweep(
    base: &DispatchParams,
    first_seed: u64,
    count: usize,
    pricing: &PricingConfig,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<SweepResult>, Box<dyn Error>> {
    let sets = ParameterSpace::grid()
        .with_base(base.clone())
        .seed_range(first_seed, count)
        .generate();
    run_parameter_sweep(&sets, pricing, num_threads, show_progress)
}
