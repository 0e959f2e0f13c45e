// percept_sim/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// Re-export the percept_core prelude so the pure sensor models and message
// types are available everywhere.
pub use percept_core::prelude::*;

// Common simulation-specific types.
pub use crate::simulation::config::structs::*;
pub use crate::simulation::core::app_state::{AppState, SceneBuildSet, SimulationSet};
pub use crate::simulation::core::components::{GroundTruthState, SensorMount};
pub use crate::simulation::core::events::MeasurementEvent;
pub use crate::simulation::core::spawn_requests::SpawnAgentConfigRequest;
