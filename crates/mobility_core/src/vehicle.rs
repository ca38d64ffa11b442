//! Vehicle profiles: static speed, emission and capacity figures per vehicle kind.
//!
//! Speed depends on traffic through a per-kind curve. Each curve is a pure
//! function of the traffic level (0–100) returning a whole-percent reduction
//! that is capped per kind:
//!
//! - Bike: 1% per 5 traffic points, capped at 30%
//! - Car: 1% per traffic point, capped at 60%
//! - Bus: 1% per 2 traffic points, capped at 50%

use serde::{Deserialize, Serialize};

/// Highest traffic level accepted by the speed curves; larger inputs are clamped.
pub const MAX_TRAFFIC_LEVEL: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VehicleKind {
    Bike,
    Car,
    Bus,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 3] = [VehicleKind::Bike, VehicleKind::Car, VehicleKind::Bus];

    pub fn name(self) -> &'static str {
        match self {
            VehicleKind::Bike => "Bike",
            VehicleKind::Car => "Car",
            VehicleKind::Bus => "Bus",
        }
    }

    pub fn profile(self) -> &'static VehicleProfile {
        match self {
            VehicleKind::Bike => &BIKE,
            VehicleKind::Car => &CAR,
            VehicleKind::Bus => &BUS,
        }
    }

    /// Speed in km/h at the given traffic level.
    pub fn speed_kmh(self, traffic_level: u8) -> f64 {
        let profile = self.profile();
        profile.base_speed_kmh * (1.0 - (profile.speed_curve)(traffic_level))
    }

    /// Operational emissions in grams of CO2 for a trip of `distance_km`.
    pub fn emissions_g(self, distance_km: f64) -> f64 {
        self.profile().emissions_g_per_km * distance_km
    }

    /// Production footprint of one vehicle, converted to grams of CO2.
    pub fn embodied_emissions_g(self) -> f64 {
        self.profile().embodied_emissions_kg * 1000.0
    }

    /// Operational emissions plus the full production footprint, in grams.
    pub fn total_emissions_g(self, distance_km: f64) -> f64 {
        self.emissions_g(distance_km) + self.embodied_emissions_g()
    }

    pub fn capacity(self) -> u32 {
        self.profile().capacity
    }
}

impl std::fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Static figures for one vehicle kind.
#[derive(Debug)]
pub struct VehicleProfile {
    pub kind: VehicleKind,
    /// Free-flow speed in km/h.
    pub base_speed_kmh: f64,
    pub emissions_g_per_km: f64,
    /// Production footprint in kg CO2. Counted in the total, not the operational figure.
    pub embodied_emissions_kg: f64,
    /// Maximum passengers per vehicle.
    pub capacity: u32,
    /// Fraction of base speed lost at a traffic level.
    pub speed_curve: fn(u8) -> f64,
}

pub static BIKE: VehicleProfile = VehicleProfile {
    kind: VehicleKind::Bike,
    base_speed_kmh: 18.0,
    emissions_g_per_km: 0.0,
    embodied_emissions_kg: 100.0,
    capacity: 1,
    speed_curve: bike_speed_reduction,
};

pub static CAR: VehicleProfile = VehicleProfile {
    kind: VehicleKind::Car,
    base_speed_kmh: 60.0,
    emissions_g_per_km: 150.0,
    embodied_emissions_kg: 5000.0,
    capacity: 4,
    speed_curve: car_speed_reduction,
};

pub static BUS: VehicleProfile = VehicleProfile {
    kind: VehicleKind::Bus,
    base_speed_kmh: 40.0,
    emissions_g_per_km: 90.0,
    embodied_emissions_kg: 20000.0,
    capacity: 50,
    speed_curve: bus_speed_reduction,
};

fn percent_reduction(traffic_level: u8, points_per_percent: u8, cap_percent: u8) -> f64 {
    let level = traffic_level.min(MAX_TRAFFIC_LEVEL);
    let percent = (level / points_per_percent).min(cap_percent);
    f64::from(percent) / 100.0
}

pub fn bike_speed_reduction(traffic_level: u8) -> f64 {
    percent_reduction(traffic_level, 5, 30)
}

pub fn car_speed_reduction(traffic_level: u8) -> f64 {
    percent_reduction(traffic_level, 1, 60)
}

pub fn bus_speed_reduction(traffic_level: u8) -> f64 {
    percent_reduction(traffic_level, 2, 50)
}
