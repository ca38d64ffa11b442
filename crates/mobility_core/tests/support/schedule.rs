#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use mobility_core::error::SimulationError;
use mobility_core::runner::{dispatch_schedule, run_day, run_day_with_hook, run_next_tick};

/// Owns a reusable `Schedule` so tests can step minute by minute or run the day.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    pub fn new() -> Self {
        Self {
            schedule: dispatch_schedule(),
        }
    }

    /// Run a single minute (returns `true` if a minute was simulated).
    pub fn run_one(&mut self, world: &mut World) -> bool {
        run_next_tick(world, &mut self.schedule).expect("tick succeeds")
    }

    /// Run `minutes` minutes without finalizing the day.
    pub fn run_minutes(&mut self, world: &mut World, minutes: u32) -> u32 {
        let mut ran = 0;
        while ran < minutes && self.run_one(world) {
            ran += 1;
        }
        ran
    }

    /// Run the rest of the day and finalize it.
    pub fn run_full(&mut self, world: &mut World) -> Result<u32, SimulationError> {
        run_day(world, &mut self.schedule)
    }

    pub fn run_full_with_hook<F>(&mut self, world: &mut World, hook: F) -> Result<u32, SimulationError>
    where
        F: FnMut(&World, u32),
    {
        run_day_with_hook(world, &mut self.schedule, hook)
    }
}
