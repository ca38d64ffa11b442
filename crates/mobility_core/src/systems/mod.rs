pub mod dispatch;
pub mod telemetry_snapshot;
