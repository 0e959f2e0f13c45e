// percept_sim/src/simulation/core/components.rs

use bevy::prelude::Component;
use percept_core::types::{GroundTruth, Pose};

/// The authoritative physics state of an agent, in ENU, refreshed every
/// fixed step from the avian3d body.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct GroundTruthState(pub GroundTruth);

/// Static pose of a sensor in its parent agent's body frame (FLU).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SensorMount(pub Pose);

impl SensorMount {
    /// Ground truth at the mount point: the agent pose composed with the
    /// mount, and the agent velocity carried to the lever arm.
    pub fn truth_at_mount(&self, agent: &GroundTruth) -> GroundTruth {
        let pose = agent.pose.compose(&self.0);
        let lever_arm_world = agent.pose.orientation * self.0.position.coords;
        let linear_velocity = agent.linear_velocity.map(|v| match agent.angular_velocity {
            Some(w) => v + w.cross(&lever_arm_world),
            None => v,
        });
        GroundTruth {
            pose,
            linear_velocity,
            angular_velocity: agent.angular_velocity,
        }
    }
}
