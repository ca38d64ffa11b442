use std::fmt;

use crate::trip::TripError;

/// Problems found before the simulation starts. All of them abort the run.
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Json(String),
    EmptyTable,
    InvalidTime { block: String, value: String },
    ZeroMinutes { block: String },
    MissingScenario { block: String, scenario: String },
    InvalidArrivals { block: String, scenario: String, value: f64 },
    /// No block covers the minute and there is no `night` fallback block.
    UnmappedMinute { minute: u32 },
    OverlappingBlocks { minute: u32, first: String, second: String },
    InvalidProbability { name: &'static str, value: f64 },
    InvalidDayLength(u32),
    NoScenarios,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(message) => write!(f, "failed to read demand table: {message}"),
            ConfigError::Json(message) => write!(f, "malformed demand table: {message}"),
            ConfigError::EmptyTable => write!(f, "demand table has no time blocks"),
            ConfigError::InvalidTime { block, value } => {
                write!(f, "block {block}: invalid time {value:?}, expected HH:MM")
            }
            ConfigError::ZeroMinutes { block } => {
                write!(f, "block {block}: minutes must be greater than zero")
            }
            ConfigError::MissingScenario { block, scenario } => {
                write!(f, "block {block}: no arrival count for scenario {scenario}")
            }
            ConfigError::InvalidArrivals {
                block,
                scenario,
                value,
            } => write!(
                f,
                "block {block}: arrival count {value} for scenario {scenario} must be finite and >= 0"
            ),
            ConfigError::UnmappedMinute { minute } => write!(
                f,
                "minute {minute} is not covered by any block and no \"night\" block exists"
            ),
            ConfigError::OverlappingBlocks {
                minute,
                first,
                second,
            } => write!(f, "blocks {first} and {second} both cover minute {minute}"),
            ConfigError::InvalidProbability { name, value } => {
                write!(f, "{name} must be within [0, 1], got {value}")
            }
            ConfigError::InvalidDayLength(minutes) => {
                write!(f, "day length must be within 1..=1440 minutes, got {minutes}")
            }
            ConfigError::NoScenarios => write!(f, "at least one demand scenario is required"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug)]
pub enum SimulationError {
    Config(ConfigError),
    /// A request could not be synthesized; the run stops at the offending tick.
    TripGeneration {
        minute: u32,
        scenario: String,
        source: TripError,
    },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Config(err) => write!(f, "configuration error: {err}"),
            SimulationError::TripGeneration {
                minute,
                scenario,
                source,
            } => write!(
                f,
                "trip generation failed for scenario {scenario} at minute {minute}: {source}"
            ),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(err) => Some(err),
            SimulationError::TripGeneration { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::Config(err)
    }
}
