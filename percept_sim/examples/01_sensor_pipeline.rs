// percept_sim/examples/01_sensor_pipeline.rs

//! Runs a scenario headless and logs every measurement.
//!
//! To run this example from the workspace root:
//! `cargo run --example 01_sensor_pipeline -- --scenario assets/scenarios/urban_block.toml`

use std::time::Duration;

use avian3d::prelude::*;
use bevy::{
    app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*, scene::ScenePlugin,
    state::app::StatesPlugin,
};
use clap::Parser;

use percept_sim::cli::Cli;
use percept_sim::prelude::AppState;
use percept_sim::simulation::config::load_scenario;
use percept_sim::PerceptSimulationPlugin;

fn main() -> AppExit {
    let cli = Cli::parse();

    // --- 1. Load Simulation Configuration ---
    let mut config = match load_scenario(&cli.scenario) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load scenario '{}': {}", cli.scenario.display(), e);
            return AppExit::error();
        }
    };
    if let Some(duration) = cli.duration {
        config.simulation.duration_seconds = duration;
    }
    if cli.seed.is_some() {
        config.simulation.seed = cli.seed;
    }

    let mut app = App::new();

    // --- 2. Add Core Bevy Plugins & Resources ---
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))),
    )
    .add_plugins((
        LogPlugin {
            level: bevy::log::Level::INFO,
            filter: "info,percept_sim=debug,percept_core=debug".to_string(),
            ..default()
        },
        TransformPlugin,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ))
    .init_asset::<Mesh>()
    .add_plugins(PhysicsPlugins::default())
    .insert_resource(config);

    app.init_state::<AppState>();

    // --- 3. Add the Main Simulation Plugin ---
    app.add_plugins(PerceptSimulationPlugin);

    info!("Starting Percept simulation...");
    app.run()
}
