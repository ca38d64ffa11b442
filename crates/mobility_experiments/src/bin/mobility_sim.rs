use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use bevy_ecs::prelude::World;
use clap::{Args, Parser, Subcommand, ValueEnum};
use mobility_core::clock::format_hhmm;
use mobility_core::demand::DemandTable;
use mobility_core::modal::{run_modal_study, ModalStudyParams, ModalSummary, DEFAULT_SHIFT_FRACTIONS};
use mobility_core::pricing::PricingConfig;
use mobility_core::report::summarize;
use mobility_core::runner::{collect_stats, dispatch_schedule, run_day_with_hook, scenario_states};
use mobility_core::scenario::{
    build_scenario, DispatchParams, DEFAULT_CANCEL_PROBABILITY, DEFAULT_SEED,
    DEFAULT_TIMEOUT_MINUTES,
};
use mobility_core::telemetry::DispatchTelemetry;
use mobility_core::traffic::TimeOfDay;
use mobility_core::trip::FleetMix;
use mobility_core::vehicle::VehicleKind;
use mobility_experiments::metrics::mean_success_rate_by_scenario;
use mobility_experiments::{
    export_snapshots_csv, export_to_csv, export_to_json, export_trip_records_csv,
    run_parameter_sweep, ParameterSpace,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "mobility_sim",
    about = "Minute-by-minute dispatch simulation for urban mobility"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one day of dispatch and print the per-scenario report
    Dispatch(DispatchArgs),
    /// Run a parameter grid in parallel and export the results
    Sweep(SweepArgs),
    /// Compare vehicle kinds over a batch of trips
    Modal(ModalArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Fleet {
    Bike,
    Car,
    Bus,
    Uniform,
}

impl From<Fleet> for FleetMix {
    fn from(fleet: Fleet) -> Self {
        match fleet {
            Fleet::Bike => FleetMix::Single(VehicleKind::Bike),
            Fleet::Car => FleetMix::Single(VehicleKind::Car),
            Fleet::Bus => FleetMix::Single(VehicleKind::Bus),
            Fleet::Uniform => FleetMix::Uniform,
        }
    }
}

#[derive(Args)]
struct RunArgs {
    /// Demand table JSON; the built-in weekday table when omitted
    #[arg(long, env = "MOBILITY_DEMAND")]
    demand: Option<PathBuf>,
    /// Simulated minutes, starting at 00:00
    #[arg(long, default_value_t = 1440)]
    day_length: u32,
    /// Scenario names to simulate (repeatable)
    #[arg(long = "scenario")]
    scenarios: Vec<String>,
    #[arg(long, value_enum, default_value_t = Fleet::Bike)]
    fleet: Fleet,
}

impl RunArgs {
    fn base_params(&self) -> Result<DispatchParams, Box<dyn std::error::Error>> {
        let mut params = DispatchParams::default()
            .with_day_length_minutes(self.day_length)
            .with_fleet_mix(self.fleet.into());
        if let Some(path) = &self.demand {
            params = params.with_demand(DemandTable::from_path(path)?);
        }
        if !self.scenarios.is_empty() {
            params = params.with_scenarios(self.scenarios.clone());
        }
        Ok(params)
    }
}

#[derive(Args)]
struct DispatchArgs {
    #[command(flatten)]
    run: RunArgs,
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Minutes before a waiting request may cancel
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MINUTES)]
    timeout: u32,
    /// Chance a timed-out request cancels, per minute
    #[arg(long, default_value_t = DEFAULT_CANCEL_PROBABILITY)]
    cancel_prob: f64,
    /// Real milliseconds to pause after every simulated minute
    #[arg(long, default_value_t = 0)]
    pace_ms: u64,
    /// Print a status line every simulated hour
    #[arg(long)]
    live: bool,
    /// Write the report as JSON
    #[arg(long)]
    json_out: Option<PathBuf>,
    /// Write telemetry snapshots as CSV
    #[arg(long)]
    snapshots_csv: Option<PathBuf>,
    /// Minutes between telemetry snapshots
    #[arg(long, default_value_t = 60)]
    snapshot_interval: u32,
}

#[derive(Args)]
struct SweepArgs {
    #[command(flatten)]
    run: RunArgs,
    /// First seed of the sweep
    #[arg(long, default_value_t = 1)]
    first_seed: u64,
    /// Seeds per parameter combination
    #[arg(long, default_value_t = 10)]
    seeds: usize,
    #[arg(long, value_delimiter = ',', default_value = "5")]
    timeouts: Vec<u32>,
    #[arg(long, value_delimiter = ',', default_value = "0.8")]
    cancel_probs: Vec<f64>,
    /// Worker threads; all cores when omitted
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long)]
    csv_out: Option<PathBuf>,
    #[arg(long)]
    json_out: Option<PathBuf>,
    #[arg(long)]
    no_progress: bool,
}

#[derive(Args)]
struct ModalArgs {
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    #[arg(long, default_value_t = 10_000)]
    trips: usize,
    /// night, off_peak, midday or rush_hour
    #[arg(long, default_value = "rush_hour")]
    time_of_day: TimeOfDay,
    /// Fix the origin zone (requires --destination)
    #[arg(long, requires = "destination")]
    origin: Option<String>,
    #[arg(long, requires = "origin")]
    destination: Option<String>,
    /// Car-to-bike shift fractions to report CO2 savings for
    #[arg(long, value_delimiter = ',')]
    shift: Vec<f64>,
    /// Write every generated trip as CSV
    #[arg(long)]
    csv_out: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Dispatch(args) => dispatch(args),
        Commands::Sweep(args) => sweep(args),
        Commands::Modal(args) => modal(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(args: DispatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let params = args
        .run
        .base_params()?
        .with_seed(args.seed)
        .with_timeout_minutes(args.timeout)
        .with_cancel_probability(args.cancel_prob)
        .with_snapshot_interval_minutes(Some(args.snapshot_interval));

    let mut world = World::new();
    build_scenario(&mut world, &params)?;
    let mut schedule = dispatch_schedule();
    let pace = Duration::from_millis(args.pace_ms);

    run_day_with_hook(&mut world, &mut schedule, |world, minute| {
        if args.live && minute % 60 == 0 {
            let line: Vec<String> = scenario_states(world)
                .iter()
                .map(|s| {
                    format!(
                        "{} {}/{}/{}",
                        s.name,
                        s.stats.serviced_count,
                        s.stats.cancelled_count,
                        s.pending_len()
                    )
                })
                .collect();
            println!("[{}] served/cancelled/waiting: {}", format_hhmm(minute), line.join(" | "));
        }
        if !pace.is_zero() {
            thread::sleep(pace);
        }
    })?;

    let report = summarize(&collect_stats(&world), &PricingConfig::default());
    println!("{report}");

    if let Some(path) = &args.json_out {
        export_to_json(std::slice::from_ref(&report), path)?;
        info!(path = %path.display(), "report written");
    }
    if let Some(path) = &args.snapshots_csv {
        export_snapshots_csv(&world.resource::<DispatchTelemetry>().snapshots, path)?;
        info!(path = %path.display(), "snapshots written");
    }
    Ok(())
}

fn sweep(args: SweepArgs) -> Result<(), Box<dyn std::error::Error>> {
    let sets = ParameterSpace::grid()
        .with_base(args.run.base_params()?)
        .timeout_minutes(args.timeouts.clone())
        .cancel_probabilities(args.cancel_probs.clone())
        .seed_range(args.first_seed, args.seeds)
        .generate();

    let results = run_parameter_sweep(
        &sets,
        &PricingConfig::default(),
        args.threads,
        !args.no_progress,
    )?;

    for (scenario, rate) in mean_success_rate_by_scenario(&results) {
        println!("{scenario:12} mean success rate {:.1}%", rate * 100.0);
    }
    if let Some(path) = &args.csv_out {
        export_to_csv(&results, path)?;
        info!(path = %path.display(), rows = results.len(), "sweep results written");
    }
    if let Some(path) = &args.json_out {
        export_to_json(&results, path)?;
        info!(path = %path.display(), rows = results.len(), "sweep results written");
    }
    Ok(())
}

fn modal(args: ModalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut params = ModalStudyParams::default()
        .with_seed(args.seed)
        .with_trips(args.trips)
        .with_time_of_day(args.time_of_day);
    if let (Some(origin), Some(destination)) = (args.origin, args.destination) {
        params = params.with_od_pair(origin, destination);
    }

    let trips = run_modal_study(&params)?;
    let summary = ModalSummary::from_trips(&trips);
    println!("{summary}");

    let shifts = if args.shift.is_empty() {
        DEFAULT_SHIFT_FRACTIONS.to_vec()
    } else {
        args.shift
    };
    for shift in shifts {
        match summary.co2_savings_kg(shift) {
            Some(kg) => println!(
                "CO2 saved if {:.1}% of car trips move to bike: {kg:.2} kg",
                shift * 100.0
            ),
            None => println!("CO2 savings not available: no car trips generated"),
        }
    }

    if let Some(path) = &args.csv_out {
        export_trip_records_csv(&trips, path)?;
        info!(path = %path.display(), trips = trips.len(), "trips written");
    }
    Ok(())
}
