//! City zones and origin-destination distances.

use std::collections::BTreeMap;

use crate::vehicle::VehicleKind;

/// Source of trip distances between zones.
///
/// `None` means no known route; callers must not turn that into a trip.
pub trait DistanceProvider: Send + Sync + std::fmt::Debug {
    fn distance_km(&self, origin: &str, destination: &str, mode: VehicleKind) -> Option<f64>;

    /// Ordered list of origin-destination pairs trips are drawn from.
    fn od_pairs(&self) -> &[(String, String)];
}

/// Static, symmetric OD matrix. The same distance applies to every mode.
#[derive(Debug, Clone)]
pub struct OdMatrix {
    distances: BTreeMap<(String, String), f64>,
    pairs: Vec<(String, String)>,
}

impl OdMatrix {
    /// Build a matrix from one-directional entries; every entry is mirrored.
    pub fn from_entries(entries: &[(&str, &str, f64)]) -> Self {
        let mut distances = BTreeMap::new();
        for &(origin, destination, km) in entries {
            distances.insert((origin.to_string(), destination.to_string()), km);
            distances.insert((destination.to_string(), origin.to_string()), km);
        }
        let pairs = distances.keys().cloned().collect();
        Self { distances, pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl DistanceProvider for OdMatrix {
    fn distance_km(&self, origin: &str, destination: &str, _mode: VehicleKind) -> Option<f64> {
        self.distances
            .get(&(origin.to_string(), destination.to_string()))
            .copied()
    }

    fn od_pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

pub const EINDHOVEN_ZONES: [&str; 6] = [
    "Centrum",
    "Strijp-S",
    "TU/e",
    "Woensel",
    "Tongelre",
    "Gestel",
];

/// Distances (km) from the city centre to the surrounding districts.
pub fn eindhoven_od_matrix() -> OdMatrix {
    OdMatrix::from_entries(&[
        ("Centrum", "Strijp-S", 2.0),
        ("Centrum", "TU/e", 2.5),
        ("Centrum", "Woensel", 4.0),
        ("Centrum", "Tongelre", 3.2),
        ("Centrum", "Gestel", 3.8),
    ])
}
