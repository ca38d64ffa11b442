pub mod city;
pub mod clock;
pub mod demand;
pub mod ecs;
pub mod error;
pub mod modal;
pub mod pricing;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod systems;
pub mod telemetry;
pub mod traffic;
pub mod trip;
pub mod vehicle;
pub mod weather;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
