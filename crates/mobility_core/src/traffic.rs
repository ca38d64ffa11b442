//! Traffic model: time-of-day traffic levels with optional per-zone overrides.
//!
//! Traffic is expressed as an integer level 0–100 (0 = empty roads). Vehicle
//! speed curves in [`crate::vehicle`] turn that level into a speed reduction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::clock::MINUTES_PER_DAY;

// ---------------------------------------------------------------------------
// Time-of-day categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Night,
    OffPeak,
    Midday,
    RushHour,
}

impl TimeOfDay {
    /// Classify a minute of the day.
    ///
    /// - 07:00–09:30, 15:30–18:30: rush hour
    /// - 09:30–15:30: midday
    /// - 18:30–22:00: off-peak
    /// - 22:00–07:00: night
    pub fn from_minute(minute: u32) -> Self {
        let m = minute % MINUTES_PER_DAY;
        match m {
            420..=569 => TimeOfDay::RushHour,
            570..=929 => TimeOfDay::Midday,
            930..=1109 => TimeOfDay::RushHour,
            1110..=1319 => TimeOfDay::OffPeak,
            _ => TimeOfDay::Night,
        }
    }

    /// A minute that falls inside this period, for callers that only know the category.
    pub fn representative_minute(self) -> u32 {
        match self {
            TimeOfDay::Night => 2 * 60,
            TimeOfDay::OffPeak => 20 * 60,
            TimeOfDay::Midday => 12 * 60,
            TimeOfDay::RushHour => 8 * 60,
        }
    }

    /// Default traffic level when no zone override exists.
    pub fn default_level(self) -> u8 {
        match self {
            TimeOfDay::Night => 10,
            TimeOfDay::OffPeak => 30,
            TimeOfDay::Midday => 50,
            TimeOfDay::RushHour => 80,
        }
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "night" => Ok(TimeOfDay::Night),
            "off_peak" => Ok(TimeOfDay::OffPeak),
            "midday" => Ok(TimeOfDay::Midday),
            "rush_hour" => Ok(TimeOfDay::RushHour),
            other => Err(format!("unknown time of day: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Zone overrides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TrafficModel {
    zone_levels: HashMap<String, HashMap<TimeOfDay, u8>>,
}

impl TrafficModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the traffic level of a zone at a time of day.
    pub fn set_zone_traffic(&mut self, zone: &str, time_of_day: TimeOfDay, level: u8) {
        self.zone_levels
            .entry(zone.to_string())
            .or_default()
            .insert(time_of_day, level.min(100));
    }

    fn zone_level(&self, zone: &str, time_of_day: TimeOfDay) -> Option<u8> {
        self.zone_levels
            .get(zone)
            .and_then(|levels| levels.get(&time_of_day))
            .copied()
    }

    /// Traffic between two zones: the mean of both overrides when both exist,
    /// the single override when one exists, otherwise the time-of-day default.
    pub fn traffic_level(&self, origin: &str, destination: &str, time_of_day: TimeOfDay) -> u8 {
        match (
            self.zone_level(origin, time_of_day),
            self.zone_level(destination, time_of_day),
        ) {
            (Some(a), Some(b)) => ((u16::from(a) + u16::from(b)) / 2) as u8,
            (Some(level), None) | (None, Some(level)) => level,
            (None, None) => time_of_day.default_level(),
        }
    }
}
