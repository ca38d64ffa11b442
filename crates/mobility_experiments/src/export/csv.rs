use mobility_core::telemetry::TickSnapshot;
use mobility_core::trip::TripRequest;

use crate::metrics::SweepResult;

pub(crate) fn export_to_csv_impl(
    results: &[SweepResult],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "experiment_id",
        "run_id",
        "seed",
        "timeout_minutes",
        "cancel_probability",
        "fleet_mix",
        "scenario",
        "total_requests",
        "serviced_count",
        "cancelled_count",
        "end_of_day_cancelled",
        "success_rate",
        "cancellation_rate",
        "avg_wait_minutes",
        "median_wait_minutes",
        "p90_wait_minutes",
        "total_value",
    ])?;

    for row in results {
        wtr.write_record([
            row.experiment_id.clone(),
            row.run_id.to_string(),
            row.seed.to_string(),
            row.timeout_minutes.to_string(),
            row.cancel_probability.to_string(),
            row.fleet_mix.clone(),
            row.scenario.clone(),
            row.total_requests.to_string(),
            row.serviced_count.to_string(),
            row.cancelled_count.to_string(),
            row.end_of_day_cancelled.to_string(),
            format!("{:.6}", row.success_rate),
            format!("{:.6}", row.cancellation_rate),
            format!("{:.4}", row.avg_wait_minutes),
            format!("{:.1}", row.median_wait_minutes),
            format!("{:.1}", row.p90_wait_minutes),
            format!("{:.2}", row.total_value),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_snapshots_csv_impl(
    snapshots: &[TickSnapshot],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);
    for snapshot in snapshots {
        wtr.serialize(snapshot)?;
    }
    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_trip_records_csv_impl(
    trips: &[TripRequest],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "request_minute",
        "origin",
        "destination",
        "distance_km",
        "vehicle",
        "passengers",
        "weather",
        "traffic_level",
        "duration_minutes",
        "clear_weather_duration_minutes",
        "emissions_g",
        "emissions_per_passenger_g",
        "total_emissions_g",
        "total_emissions_per_passenger_g",
    ])?;

    for trip in trips {
        wtr.write_record([
            trip.request_time().to_string(),
            trip.origin().to_string(),
            trip.destination().to_string(),
            trip.distance_km().to_string(),
            trip.vehicle_kind().name().to_string(),
            trip.passenger_count().to_string(),
            trip.weather().name().to_string(),
            trip.traffic_level().to_string(),
            trip.duration_minutes().to_string(),
            trip.clear_weather_duration_minutes().to_string(),
            format!("{:.2}", trip.emissions_g()),
            format!("{:.2}", trip.emissions_per_passenger_g()),
            format!("{:.2}", trip.total_emissions_g()),
            format!("{:.2}", trip.total_emissions_per_passenger_g()),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
