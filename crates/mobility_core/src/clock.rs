use bevy_ecs::prelude::Resource;

pub const MINUTES_PER_HOUR: u32 = 60;
pub const MINUTES_PER_DAY: u32 = 24 * MINUTES_PER_HOUR;

/// Tick clock for the dispatch simulation. One tick is one simulated minute;
/// the runner advances it, systems only read it.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimulationClock {
    now: u32,
    next: u32,
    day_length: u32,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(MINUTES_PER_DAY)
    }
}

impl SimulationClock {
    pub fn new(day_length: u32) -> Self {
        Self {
            now: 0,
            next: 0,
            day_length,
        }
    }

    /// Current simulated minute.
    pub fn now(&self) -> u32 {
        self.now
    }

    pub fn day_length(&self) -> u32 {
        self.day_length
    }

    pub fn last_minute(&self) -> u32 {
        self.day_length.saturating_sub(1)
    }

    /// Move to the next minute. Returns `None` once the day is over.
    pub fn advance(&mut self) -> Option<u32> {
        if self.next >= self.day_length {
            return None;
        }
        self.now = self.next;
        self.next += 1;
        Some(self.now)
    }

    /// Minute-of-day for block and traffic lookups.
    pub fn minute_of_day(&self) -> u32 {
        self.now % MINUTES_PER_DAY
    }

    pub fn is_hour_boundary(&self) -> bool {
        self.now % MINUTES_PER_HOUR == 0 || self.now == self.last_minute()
    }
}

/// Format a minute of the day as `HH:MM`.
pub fn format_hhmm(minute: u32) -> String {
    let m = minute % MINUTES_PER_DAY;
    format!("{:02}:{:02}", m / MINUTES_PER_HOUR, m % MINUTES_PER_HOUR)
}

/// Parse `H:MM` or `HH:MM` into a minute of the day.
pub fn parse_hhmm(value: &str) -> Option<u32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours >= 24 || minutes >= MINUTES_PER_HOUR {
        return None;
    }
    Some(hours * MINUTES_PER_HOUR + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_ticks_every_minute_once() {
        let mut clock = SimulationClock::default();
        assert_eq!(clock.last_minute(), 1439);
        assert_eq!(clock.advance(), Some(0));
        assert!(clock.is_hour_boundary());
        assert_eq!(clock.advance(), Some(1));
        assert!(!clock.is_hour_boundary());

        let mut ticks = 2;
        while clock.advance().is_some() {
            ticks += 1;
        }
        assert_eq!(ticks, 1440);
        assert_eq!(clock.now(), 1439);
        assert!(clock.is_hour_boundary());
        assert_eq!(clock.minute_of_day(), 1439);
        assert_eq!(clock.advance(), None);
    }

    #[test]
    fn short_days_stop_early() {
        let mut clock = SimulationClock::new(3);
        assert_eq!(clock.advance(), Some(0));
        assert_eq!(clock.advance(), Some(1));
        assert_eq!(clock.advance(), Some(2));
        assert_eq!(clock.advance(), None);
        assert_eq!(clock.now(), 2);
    }

    #[test]
    fn parses_single_and_double_digit_hours() {
        assert_eq!(parse_hhmm("07:00"), Some(420));
        assert_eq!(parse_hhmm("7:00"), Some(420));
        assert_eq!(parse_hhmm("9:30"), Some(570));
        assert_eq!(parse_hhmm("23:59"), Some(1439));
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("12:7"), None);
        assert_eq!(parse_hhmm("noon"), None);
    }

    #[test]
    fn formats_minutes() {
        assert_eq!(format_hhmm(0), "00:00");
        assert_eq!(format_hhmm(570), "09:30");
        assert_eq!(format_hhmm(1439), "23:59");
    }
}
