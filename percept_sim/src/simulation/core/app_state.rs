// percept_sim/src/simulation/core/app_state.rs

use bevy::{ecs::schedule::SystemSet, prelude::States};

/// Defines the major phases of the application's lifecycle.
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    /// The initial state. Entities are created from the scenario config.
    #[default]
    SceneBuilding,

    /// The scene is built. The main simulation loop is now running.
    Running,
}

/// System sets to control the order of execution during the SceneBuilding state.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneBuildSet {
    /// Pass 1: Create agent shells and attach the main request component.
    CreateRequests,

    /// Pass 2: Process all sensor requests and create sensor child entities.
    ProcessSensors,

    /// Pass 3: Attach all physical bodies (RigidBody, Collider).
    Physics,

    /// Pass 4: Remove all temporary request components.
    Cleanup,
}

// =========================================================================
// == Main Simulation Sets ==
// =========================================================================

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Copies the latest physics state into `GroundTruthState`.
    StateSync,
    /// Systems that simulate raw physical sensors (LiDAR, GNSS, IMU, pose).
    Sensors,
    /// Consumers of `MeasurementEvent`s (logging, recording).
    Reporting,
}
