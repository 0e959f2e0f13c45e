// percept_sim/src/simulation/core/mod.rs

use crate::simulation::core::components::GroundTruthState;
use crate::simulation::core::transforms::{bevy_to_enu_pose, bevy_vector_to_enu_vector};
use avian3d::prelude::{AngularVelocity, LinearVelocity, Position, Rotation};
use bevy::prelude::*;

/// Refreshes every agent's `GroundTruthState` from its avian3d body,
/// converting from Bevy's Y-up frame into ENU.
pub fn ground_truth_sync_system(
    mut query: Query<(
        &Position,
        &Rotation,
        Option<&LinearVelocity>,
        Option<&AngularVelocity>,
        &mut GroundTruthState,
    )>,
) {
    for (position, rotation, lin_vel, ang_vel, mut ground_truth) in &mut query {
        ground_truth.0.pose = bevy_to_enu_pose(&position.0, &rotation.0).renormalized();
        ground_truth.0.linear_velocity = lin_vel.map(|v| bevy_vector_to_enu_vector(&v.0));
        ground_truth.0.angular_velocity = ang_vel.map(|w| bevy_vector_to_enu_vector(&w.0));
    }
}

pub mod app_state;
pub mod components;
pub mod events;
pub mod prng;
pub mod simulation_setup;
pub mod spawn_requests;
pub mod transforms;
