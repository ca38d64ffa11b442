//! Result export: sweep rows, telemetry snapshots and trip records.

use std::path::Path;

use mobility_core::telemetry::TickSnapshot;
use mobility_core::trip::TripRequest;
use serde::Serialize;

use crate::metrics::SweepResult;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export sweep rows to CSV, one line per run and scenario.
///
/// # Errors
///
/// Returns an error if `results` is empty or writing fails.
pub fn export_to_csv(
    results: &[SweepResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(results)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(results, file)
}

/// Export any serializable items as a pretty-printed JSON array.
pub fn export_to_json<T: Serialize>(
    items: &[T],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(items, file)
}

/// Export telemetry snapshots to CSV.
pub fn export_snapshots_csv(
    snapshots: &[TickSnapshot],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(snapshots)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_snapshots_csv_impl(snapshots, file)
}

/// Export individual trips (e.g. from a modal study) to CSV.
pub fn export_trip_records_csv(
    trips: &[TripRequest],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(trips)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_trip_records_csv_impl(trips, file)
}
