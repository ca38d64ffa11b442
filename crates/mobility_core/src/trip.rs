//! Trip requests and the factory that synthesizes them.
//!
//! A [`TripRequest`] is immutable once built. The [`TripFactory`] draws every
//! random quantity from the RNG it is handed, in a fixed order per request:
//! vehicle kind (uniform fleet mix only), OD pair (repeated while the distance
//! provider has no route), passenger count (car and bus only), weather.

use std::fmt;

use bevy_ecs::prelude::Resource;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::city::{eindhoven_od_matrix, DistanceProvider};
use crate::traffic::{TimeOfDay, TrafficModel};
use crate::vehicle::VehicleKind;
use crate::weather::Weather;

/// OD draws attempted before giving up on finding a known route.
pub const MAX_ROUTE_ATTEMPTS: usize = 10;

/// Minimum bus load; buses are only dispatched for groups.
pub const MIN_BUS_PASSENGERS: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum TripError {
    /// No OD pair with a known distance could be drawn.
    NoKnownRoute { origin: String, destination: String },
    /// Effective speed was zero or negative, so the trip would never finish.
    NonPositiveSpeed { kind: VehicleKind, speed_kmh: f64 },
    CapacityExceeded { kind: VehicleKind, passengers: u32 },
}

impl fmt::Display for TripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripError::NoKnownRoute {
                origin,
                destination,
            } => write!(f, "no known route from {origin} to {destination}"),
            TripError::NonPositiveSpeed { kind, speed_kmh } => {
                write!(f, "{kind} has non-positive effective speed {speed_kmh} km/h")
            }
            TripError::CapacityExceeded { kind, passengers } => write!(
                f,
                "{kind} capacity exceeded: {passengers} > {}",
                kind.capacity()
            ),
        }
    }
}

impl std::error::Error for TripError {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRequest {
    request_time: u32,
    origin: String,
    destination: String,
    distance_km: f64,
    vehicle_kind: VehicleKind,
    passenger_count: u32,
    weather: Weather,
    traffic_level: u8,
    duration_minutes: u32,
}

impl TripRequest {
    /// Validate a trip and compute its duration.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        request_time: u32,
        origin: String,
        destination: String,
        distance_km: f64,
        vehicle_kind: VehicleKind,
        passenger_count: u32,
        weather: Weather,
        traffic_level: u8,
    ) -> Result<Self, TripError> {
        if passenger_count > vehicle_kind.capacity() {
            return Err(TripError::CapacityExceeded {
                kind: vehicle_kind,
                passengers: passenger_count,
            });
        }
        let duration_minutes =
            duration_minutes(distance_km, vehicle_kind, traffic_level, weather)?;
        Ok(Self {
            request_time,
            origin,
            destination,
            distance_km,
            vehicle_kind,
            passenger_count,
            weather,
            traffic_level,
            duration_minutes,
        })
    }

    pub fn request_time(&self) -> u32 {
        self.request_time
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn vehicle_kind(&self) -> VehicleKind {
        self.vehicle_kind
    }

    pub fn passenger_count(&self) -> u32 {
        self.passenger_count
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn traffic_level(&self) -> u8 {
        self.traffic_level
    }

    /// Ride time in whole minutes.
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Ride time the same trip would take in clear weather.
    pub fn clear_weather_duration_minutes(&self) -> u32 {
        duration_minutes(
            self.distance_km,
            self.vehicle_kind,
            self.traffic_level,
            Weather::Clear,
        )
        .unwrap_or(self.duration_minutes)
    }

    pub fn emissions_g(&self) -> f64 {
        self.vehicle_kind.emissions_g(self.distance_km)
    }

    pub fn emissions_per_passenger_g(&self) -> f64 {
        self.emissions_g() / f64::from(self.passenger_count.max(1))
    }

    /// Operational plus production emissions in grams.
    pub fn total_emissions_g(&self) -> f64 {
        self.vehicle_kind.total_emissions_g(self.distance_km)
    }

    pub fn total_emissions_per_passenger_g(&self) -> f64 {
        self.total_emissions_g() / f64::from(self.passenger_count.max(1))
    }
}

/// Effective speed (traffic curve × weather) and rounded ride minutes.
pub fn duration_minutes(
    distance_km: f64,
    kind: VehicleKind,
    traffic_level: u8,
    weather: Weather,
) -> Result<u32, TripError> {
    let speed_kmh = kind.speed_kmh(traffic_level) * weather.speed_factor();
    if !(speed_kmh > 0.0) {
        return Err(TripError::NonPositiveSpeed { kind, speed_kmh });
    }
    let minutes = (distance_km.max(0.0) / speed_kmh * 60.0).round();
    if !minutes.is_finite() || minutes > f64::from(u32::MAX) {
        return Err(TripError::NonPositiveSpeed { kind, speed_kmh });
    }
    Ok(minutes as u32)
}

/// Which vehicle kinds a factory hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetMix {
    /// Every trip uses this kind (no draw).
    Single(VehicleKind),
    /// Uniform over all vehicle kinds (one draw).
    Uniform,
}

impl Default for FleetMix {
    fn default() -> Self {
        FleetMix::Single(VehicleKind::Bike)
    }
}

#[derive(Debug, Resource)]
pub struct TripFactory {
    distances: Box<dyn DistanceProvider>,
    traffic: TrafficModel,
    fleet_mix: FleetMix,
}

impl Default for TripFactory {
    fn default() -> Self {
        Self::new(
            Box::new(eindhoven_od_matrix()),
            TrafficModel::default(),
            FleetMix::default(),
        )
    }
}

impl TripFactory {
    pub fn new(
        distances: Box<dyn DistanceProvider>,
        traffic: TrafficModel,
        fleet_mix: FleetMix,
    ) -> Self {
        Self {
            distances,
            traffic,
            fleet_mix,
        }
    }

    pub fn with_fleet_mix(mut self, fleet_mix: FleetMix) -> Self {
        self.fleet_mix = fleet_mix;
        self
    }

    pub fn fleet_mix(&self) -> FleetMix {
        self.fleet_mix
    }

    pub fn traffic_model(&self) -> &TrafficModel {
        &self.traffic
    }

    /// Synthesize one request arriving at `minute`.
    pub fn generate<R: Rng>(&self, rng: &mut R, minute: u32) -> Result<TripRequest, TripError> {
        let kind = match self.fleet_mix {
            FleetMix::Single(kind) => kind,
            FleetMix::Uniform => VehicleKind::ALL[rng.gen_range(0..VehicleKind::ALL.len())],
        };
        let (origin, destination, distance_km) = self.draw_route(rng, kind)?;
        self.build(rng, minute, origin, destination, distance_km, kind)
    }

    /// Synthesize a request for a fixed OD pair.
    pub fn generate_for_pair<R: Rng>(
        &self,
        rng: &mut R,
        minute: u32,
        origin: &str,
        destination: &str,
    ) -> Result<TripRequest, TripError> {
        let kind = match self.fleet_mix {
            FleetMix::Single(kind) => kind,
            FleetMix::Uniform => VehicleKind::ALL[rng.gen_range(0..VehicleKind::ALL.len())],
        };
        let distance_km = self
            .distances
            .distance_km(origin, destination, kind)
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| TripError::NoKnownRoute {
                origin: origin.to_string(),
                destination: destination.to_string(),
            })?;
        self.build(
            rng,
            minute,
            origin.to_string(),
            destination.to_string(),
            distance_km,
            kind,
        )
    }

    fn draw_route<R: Rng>(
        &self,
        rng: &mut R,
        kind: VehicleKind,
    ) -> Result<(String, String, f64), TripError> {
        let pairs = self.distances.od_pairs();
        if pairs.is_empty() {
            return Err(TripError::NoKnownRoute {
                origin: String::new(),
                destination: String::new(),
            });
        }
        let mut last = &pairs[0];
        for _ in 0..MAX_ROUTE_ATTEMPTS {
            let pair = &pairs[rng.gen_range(0..pairs.len())];
            last = pair;
            let distance = self
                .distances
                .distance_km(&pair.0, &pair.1, kind)
                .filter(|d| d.is_finite() && *d >= 0.0);
            if let Some(distance_km) = distance {
                return Ok((pair.0.clone(), pair.1.clone(), distance_km));
            }
        }
        Err(TripError::NoKnownRoute {
            origin: last.0.clone(),
            destination: last.1.clone(),
        })
    }

    fn build<R: Rng>(
        &self,
        rng: &mut R,
        minute: u32,
        origin: String,
        destination: String,
        distance_km: f64,
        kind: VehicleKind,
    ) -> Result<TripRequest, TripError> {
        let passengers = match kind {
            VehicleKind::Bike => 1,
            VehicleKind::Car => rng.gen_range(1..=kind.capacity()),
            VehicleKind::Bus => rng.gen_range(MIN_BUS_PASSENGERS..=kind.capacity()),
        };
        let weather = Weather::sample(rng);
        let traffic_level =
            self.traffic
                .traffic_level(&origin, &destination, TimeOfDay::from_minute(minute));
        TripRequest::new(
            minute,
            origin,
            destination,
            distance_km,
            kind,
            passengers,
            weather,
            traffic_level,
        )
    }
}
