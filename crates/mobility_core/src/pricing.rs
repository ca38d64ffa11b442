//! Ride economics: value earned per completed ride.

use serde::{Deserialize, Serialize};

/// Fixed fee per completed ride in currency units.
pub const FIXED_FEE: f64 = 1.5;

/// Per-kilometer rate in currency units.
pub const PER_KM_RATE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub fixed_fee: f64,
    pub per_km_rate: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            fixed_fee: FIXED_FEE,
            per_km_rate: PER_KM_RATE,
        }
    }
}

impl PricingConfig {
    /// Formula: `fixed_fee + distance_km * per_km_rate`
    pub fn ride_value(&self, distance_km: f64) -> f64 {
        self.fixed_fee + distance_km * self.per_km_rate
    }

    pub fn total_value(&self, distances_km: &[f64]) -> f64 {
        distances_km.iter().map(|&d| self.ride_value(d)).sum()
    }
}
