//! Parallel experiments for the dispatch simulator.
//!
//! Runs many independent dispatch days (one world per run) with rayon,
//! turns their statistics into flat result rows and exports them.
//!
//! # Quick Start
//!
//! ```no_run
//! use mobility_experiments::{export_to_csv, run_parameter_sweep, ParameterSpace};
//! use mobility_core::pricing::PricingConfig;
//!
//! let sets = ParameterSpace::grid()
//!     .timeout_minutes(vec![3, 5, 10])
//!     .cancel_probabilities(vec![0.5, 0.8])
//!     .seeds(vec![1, 2, 3])
//!     .generate();
//!
//! let results = run_parameter_sweep(&sets, &PricingConfig::default(), None, true).unwrap();
//! export_to_csv(&results, "sweep.csv").unwrap();
//! ```
//!
//! - [`parameters`]: parameter grid and seed sweeps
//! - [`runner`]: parallel execution using rayon
//! - [`metrics`]: one result row per run and scenario
//! - [`export`]: CSV/JSON export of results, snapshots and trips

pub mod export;
pub mod metrics;
pub mod parameters;
pub mod runner;

pub use export::{export_snapshots_csv, export_to_csv, export_to_json, export_trip_records_csv};
pub use metrics::SweepResult;
pub use parameters::{ParameterSet, ParameterSpace};
pub use runner::{run_parameter_sweep, run_seed_sweep, run_single_simulation};
