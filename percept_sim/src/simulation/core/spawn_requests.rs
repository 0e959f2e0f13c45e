// percept_sim/src/simulation/core/spawn_requests.rs
use crate::simulation::config::structs::AgentConfig;
use bevy::prelude::Component;

/// Temporary marker carrying an agent's configuration through the scene
/// building passes. Removed once the scene is built.
#[derive(Component, Clone)]
pub struct SpawnAgentConfigRequest(pub AgentConfig);
