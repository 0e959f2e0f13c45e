// percept_sim/src/lib.rs

use bevy::prelude::*;

use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::debugging::MeasurementLogPlugin;
use crate::simulation::plugins::sensors::SensorPlugins;
use crate::simulation::plugins::world::WorldSpawnerPlugin;

// This prelude is for convenience for other files WITHIN the percept_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;

/// The main plugin that brings together all the simulation parts.
///
/// The binary inserts the `ScenarioConfig` resource and initialises
/// `AppState` before adding this plugin.
pub struct PerceptSimulationPlugin;

impl Plugin for PerceptSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            // Resources, schedule sets and agent bodies.
            SimulationSetupPlugin,
            // Ground slab and obstacles for the LiDAR to see.
            WorldSpawnerPlugin,
            SensorPlugins,
            MeasurementLogPlugin,
        ));
    }
}
