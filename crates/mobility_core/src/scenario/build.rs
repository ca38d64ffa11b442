use bevy_ecs::prelude::World;
use tracing::debug;

use crate::city::eindhoven_od_matrix;
use crate::clock::SimulationClock;
use crate::demand::DemandSchedule;
use crate::ecs::{CurrentBlock, GenerationFault, ScenarioOrder, ScenarioState, SimRng};
use crate::error::ConfigError;
use crate::scenario::params::{DispatchParams, SnapshotConfig};
use crate::telemetry::DispatchTelemetry;
use crate::trip::TripFactory;

/// Populate `world` with every resource the dispatch schedule reads and one
/// entity per demand scenario. Trips are drawn from the Eindhoven matrix.
///
/// Nothing is inserted when validation fails.
pub fn build_scenario(world: &mut World, params: &DispatchParams) -> Result<(), ConfigError> {
    let factory = TripFactory::new(
        Box::new(eindhoven_od_matrix()),
        params.traffic.clone(),
        params.fleet_mix,
    );
    build_scenario_with_factory(world, params, factory)
}

/// Like [`build_scenario`] with a caller-supplied trip factory, for other
/// cities or distance providers.
pub fn build_scenario_with_factory(
    world: &mut World,
    params: &DispatchParams,
    factory: TripFactory,
) -> Result<(), ConfigError> {
    params.validate()?;
    let demand = DemandSchedule::new(&params.demand, &params.scenarios)?;
    let block_count = demand.blocks().len();
    let first_block = demand.block_id_for_minute(0);

    world.insert_resource(SimulationClock::new(params.day_length_minutes));
    world.insert_resource(params.dispatch_config());
    world.insert_resource(factory);
    world.insert_resource(SimRng::seeded(params.seed));
    world.insert_resource(CurrentBlock(first_block));
    world.insert_resource(GenerationFault::default());
    world.insert_resource(DispatchTelemetry::default());
    world.insert_resource(SnapshotConfig {
        interval_minutes: params.snapshot_interval_minutes,
    });

    for (index, name) in demand.scenarios().iter().enumerate() {
        world.spawn((ScenarioOrder(index), ScenarioState::new(name.clone(), block_count)));
    }
    debug!(
        scenarios = demand.scenarios().len(),
        blocks = block_count,
        seed = params.seed,
        "scenario built"
    );
    world.insert_resource(demand);
    Ok(())
}
