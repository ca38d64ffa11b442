use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Rain,
    Snow,
    Fog,
}

/// (weather, weight); weights sum to 1.0.
const WEATHER_WEIGHTS: [(Weather, f64); 4] = [
    (Weather::Clear, 0.60),
    (Weather::Rain, 0.25),
    (Weather::Snow, 0.10),
    (Weather::Fog, 0.05),
];

impl Weather {
    pub const ALL: [Weather; 4] = [Weather::Clear, Weather::Rain, Weather::Snow, Weather::Fog];

    /// Multiplier applied to vehicle speed.
    pub fn speed_factor(self) -> f64 {
        match self {
            Weather::Clear => 1.0,
            Weather::Rain => 0.9,
            Weather::Snow => 0.7,
            Weather::Fog => 0.85,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Weather::Clear => "clear",
            Weather::Rain => "rain",
            Weather::Snow => "snow",
            Weather::Fog => "fog",
        }
    }

    /// Map a uniform roll in `[0, 1)` onto the weighted categories.
    pub fn from_roll(roll: f64) -> Weather {
        let cumulative = cumulative_weights();
        let idx = cumulative
            .partition_point(|&w| w <= roll)
            .min(WEATHER_WEIGHTS.len() - 1);
        WEATHER_WEIGHTS[idx].0
    }

    /// Draw one weather condition (a single uniform draw).
    pub fn sample<R: Rng>(rng: &mut R) -> Weather {
        Self::from_roll(rng.gen::<f64>())
    }
}

impl std::fmt::Display for Weather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn cumulative_weights() -> [f64; 4] {
    let mut cumulative = [0.0; 4];
    let mut total = 0.0;
    for (slot, (_, weight)) in cumulative.iter_mut().zip(WEATHER_WEIGHTS) {
        total += weight;
        *slot = total;
    }
    cumulative
}
