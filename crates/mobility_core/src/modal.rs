//! Modal study: a batch of independent trips across all vehicle kinds,
//! summarized per kind, with weather delays and the CO2 a car-to-bike shift
//! would save.

use std::collections::BTreeMap;
use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::city::eindhoven_od_matrix;
use crate::traffic::{TimeOfDay, TrafficModel};
use crate::trip::{FleetMix, TripError, TripFactory, TripRequest};
use crate::vehicle::VehicleKind;
use crate::weather::Weather;

/// Extra minutes over the clear-weather ride time that make a trip delayed.
pub const DELAY_THRESHOLD_MINUTES: u32 = 6;

/// Modal-shift fractions reported by default.
pub const DEFAULT_SHIFT_FRACTIONS: [f64; 3] = [0.516, 0.31, 0.155];

#[derive(Debug, Clone)]
pub struct ModalStudyParams {
    pub seed: u64,
    pub trips: usize,
    pub time_of_day: TimeOfDay,
    /// Restrict every trip to one origin/destination pair.
    pub od_pair: Option<(String, String)>,
    pub traffic: TrafficModel,
}

impl Default for ModalStudyParams {
    fn default() -> Self {
        Self {
            seed: 42,
            trips: 10_000,
            time_of_day: TimeOfDay::RushHour,
            od_pair: None,
            traffic: TrafficModel::default(),
        }
    }
}

impl ModalStudyParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_trips(mut self, trips: usize) -> Self {
        self.trips = trips;
        self
    }

    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = time_of_day;
        self
    }

    pub fn with_od_pair(mut self, origin: impl Into<String>, destination: impl Into<String>) -> Self {
        self.od_pair = Some((origin.into(), destination.into()));
        self
    }

    pub fn with_traffic(mut self, traffic: TrafficModel) -> Self {
        self.traffic = traffic;
        self
    }
}

/// Generate the study's trips with a uniform fleet mix.
pub fn run_modal_study(params: &ModalStudyParams) -> Result<Vec<TripRequest>, TripError> {
    let factory = TripFactory::new(
        Box::new(eindhoven_od_matrix()),
        params.traffic.clone(),
        FleetMix::Uniform,
    );
    let mut rng = StdRng::seed_from_u64(params.seed);
    let minute = params.time_of_day.representative_minute();

    let trips = (0..params.trips)
        .map(|_| match &params.od_pair {
            Some((origin, destination)) => {
                factory.generate_for_pair(&mut rng, minute, origin, destination)
            }
            None => factory.generate(&mut rng, minute),
        })
        .collect::<Result<Vec<_>, _>>()?;
    info!(trips = trips.len(), time_of_day = ?params.time_of_day, "modal study generated");
    Ok(trips)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KindSummary {
    pub count: u64,
    /// Operational emissions only.
    pub avg_emissions_g: f64,
    /// Operational plus production emissions.
    pub avg_total_emissions_g: f64,
    pub avg_duration_minutes: f64,
    pub avg_distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalSummary {
    pub trip_count: usize,
    pub by_kind: BTreeMap<VehicleKind, KindSummary>,
    pub weather_counts: BTreeMap<Weather, u64>,
    pub delayed_trips: u64,
    /// Mean extra minutes over clear weather, among delayed trips.
    pub avg_delay_minutes: f64,
    /// Sum over car trips of the car minus bike emissions for the same distance.
    car_to_bike_delta_g: f64,
    car_trips: u64,
}

impl ModalSummary {
    pub fn from_trips(trips: &[TripRequest]) -> Self {
        let mut totals: BTreeMap<VehicleKind, (u64, f64, f64, f64, f64)> = BTreeMap::new();
        let mut weather_counts = BTreeMap::new();
        let mut delayed_trips = 0;
        let mut total_delay = 0u64;
        let mut car_to_bike_delta_g = 0.0;
        let mut car_trips = 0;

        for trip in trips {
            let entry = totals.entry(trip.vehicle_kind()).or_default();
            entry.0 += 1;
            entry.1 += trip.emissions_g();
            entry.2 += f64::from(trip.duration_minutes());
            entry.3 += trip.distance_km();
            entry.4 += trip.total_emissions_g();
            *weather_counts.entry(trip.weather()).or_insert(0) += 1;

            let delay = trip
                .duration_minutes()
                .saturating_sub(trip.clear_weather_duration_minutes());
            if delay > DELAY_THRESHOLD_MINUTES {
                delayed_trips += 1;
                total_delay += u64::from(delay);
            }

            if trip.vehicle_kind() == VehicleKind::Car {
                car_trips += 1;
                car_to_bike_delta_g += VehicleKind::Car.emissions_g(trip.distance_km())
                    - VehicleKind::Bike.emissions_g(trip.distance_km());
            }
        }

        let by_kind = totals
            .into_iter()
            .map(|(kind, (count, emissions, duration, distance, total))| {
                let n = count as f64;
                (
                    kind,
                    KindSummary {
                        count,
                        avg_emissions_g: emissions / n,
                        avg_total_emissions_g: total / n,
                        avg_duration_minutes: duration / n,
                        avg_distance_km: distance / n,
                    },
                )
            })
            .collect();

        Self {
            trip_count: trips.len(),
            by_kind,
            weather_counts,
            delayed_trips,
            avg_delay_minutes: if delayed_trips == 0 {
                0.0
            } else {
                total_delay as f64 / delayed_trips as f64
            },
            car_to_bike_delta_g,
            car_trips,
        }
    }

    pub fn delayed_share(&self) -> f64 {
        if self.trip_count == 0 {
            0.0
        } else {
            self.delayed_trips as f64 / self.trip_count as f64
        }
    }

    /// Kilograms of CO2 saved if `shift` (0..=1) of the car trips had been
    /// ridden by bike. `None` without car trips.
    pub fn co2_savings_kg(&self, shift: f64) -> Option<f64> {
        if self.car_trips == 0 {
            return None;
        }
        Some(self.car_to_bike_delta_g * shift.clamp(0.0, 1.0) / 1000.0)
    }
}

impl fmt::Display for ModalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Modal study: {} trips", self.trip_count)?;
        for (kind, summary) in &self.by_kind {
            writeln!(
                f,
                "{:8} | n {:5} | avg emissions {:8.2} g ({:.0} g incl. production) | avg time {:6.2} min | avg distance {:.2} km",
                kind.name(),
                summary.count,
                summary.avg_emissions_g,
                summary.avg_total_emissions_g,
                summary.avg_duration_minutes,
                summary.avg_distance_km
            )?;
        }
        let weather: Vec<String> = self
            .weather_counts
            .iter()
            .map(|(weather, count)| format!("{weather}: {count}"))
            .collect();
        writeln!(f, "Weather: {}", weather.join(", "))?;
        if self.delayed_trips > 0 {
            write!(
                f,
                "Delayed trips (>{DELAY_THRESHOLD_MINUTES} min): {} ({:.1}%), avg delay {:.1} min",
                self.delayed_trips,
                self.delayed_share() * 100.0,
                self.avg_delay_minutes
            )
        } else {
            write!(f, "No significant delays")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car_trip(distance_km: f64, weather: Weather) -> TripRequest {
        TripRequest::new(
            480,
            "Centrum".to_string(),
            "Gestel".to_string(),
            distance_km,
            VehicleKind::Car,
            1,
            weather,
            80,
        )
        .unwrap()
    }

    #[test]
    fn study_is_reproducible() {
        let params = ModalStudyParams::default().with_trips(200).with_seed(3);
        let a = run_modal_study(&params).unwrap();
        let b = run_modal_study(&params).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 200);
        assert!(a.iter().all(|t| t.request_time() == 480));
    }

    #[test]
    fn fixed_pair_study_uses_the_pair() {
        let params = ModalStudyParams::default()
            .with_trips(50)
            .with_od_pair("Centrum", "Woensel");
        let trips = run_modal_study(&params).unwrap();
        assert!(trips
            .iter()
            .all(|t| t.origin() == "Centrum" && t.destination() == "Woensel"));
    }

    #[test]
    fn unknown_pair_is_an_error() {
        let params = ModalStudyParams::default()
            .with_trips(1)
            .with_od_pair("Centrum", "Amsterdam");
        assert!(matches!(
            run_modal_study(&params),
            Err(TripError::NoKnownRoute { .. })
        ));
    }

    #[test]
    fn savings_scale_with_shift() {
        let summary = ModalSummary::from_trips(&[car_trip(2.0, Weather::Clear), car_trip(4.0, Weather::Rain)]);
        // 150 g/km × 6 km
        assert_eq!(summary.co2_savings_kg(1.0), Some(0.9));
        let half = summary.co2_savings_kg(0.5).unwrap();
        assert!((half - 0.45).abs() < 1e-12);
        assert_eq!(summary.co2_savings_kg(0.0), Some(0.0));
    }

    #[test]
    fn kind_summary_reports_operational_and_total_emissions() {
        let summary = ModalSummary::from_trips(&[car_trip(2.0, Weather::Clear), car_trip(4.0, Weather::Clear)]);
        let car = &summary.by_kind[&VehicleKind::Car];
        assert_eq!(car.avg_emissions_g, 450.0);
        assert_eq!(car.avg_total_emissions_g, 5_000_450.0);
    }

    #[test]
    fn no_car_trips_means_no_savings() {
        let summary = ModalSummary::from_trips(&[]);
        assert_eq!(summary.co2_savings_kg(0.5), None);
        assert_eq!(summary.delayed_share(), 0.0);
    }

    #[test]
    fn snow_on_a_long_car_trip_is_a_delay() {
        // Car at traffic 80: 60 × 0.4 = 24 km/h; 20 km → 50 min clear, 71 min in snow.
        let trip = car_trip(20.0, Weather::Snow);
        assert_eq!(trip.clear_weather_duration_minutes(), 50);
        assert_eq!(trip.duration_minutes(), 71);

        let summary = ModalSummary::from_trips(&[trip, car_trip(20.0, Weather::Clear)]);
        assert_eq!(summary.delayed_trips, 1);
        assert!((summary.avg_delay_minutes - 21.0).abs() < 1e-9);
        assert!((summary.delayed_share() - 0.5).abs() < 1e-9);
        assert_eq!(summary.by_kind[&VehicleKind::Car].count, 2);
        assert_eq!(summary.weather_counts[&Weather::Snow], 1);
    }
}
