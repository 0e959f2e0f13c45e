// percept_sim/src/simulation/plugins/sensors/mod.rs

pub mod ground_truth;
pub mod gps;
pub mod imu;
pub mod lidar;

use bevy::prelude::*;
use percept_core::messages::{MeasurementData, MeasurementMessage};
use percept_core::types::FrameHandle;

use crate::simulation::config::structs::PoseConfig;
use crate::simulation::core::components::SensorMount;
use crate::simulation::core::events::MeasurementEvent;

/// Adds every sensor plugin.
pub struct SensorPlugins;

impl Plugin for SensorPlugins {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            lidar::LidarPlugin,
            gps::GpsPlugin,
            imu::ImuPlugin,
            ground_truth::GroundTruthPlugin,
        ));
    }
}

/// Spawns a sensor entity with its mount and attaches it to `agent`.
fn spawn_sensor_child(
    commands: &mut Commands,
    agent: Entity,
    name: &str,
    mount: &PoseConfig,
    sensor: impl Bundle,
) -> Entity {
    let sensor_entity = commands
        .spawn((
            Name::new(name.to_string()),
            SensorMount(mount.to_pose()),
            mount.to_bevy_transform(),
            sensor,
        ))
        .id();
    commands.entity(agent).add_child(sensor_entity);
    sensor_entity
}

fn measurement_event(
    agent: Entity,
    sensor: Entity,
    timestamp: f64,
    data: MeasurementData,
) -> MeasurementEvent {
    MeasurementEvent(MeasurementMessage {
        agent_handle: FrameHandle::from_entity(agent),
        sensor_handle: FrameHandle::from_entity(sensor),
        timestamp,
        data,
    })
}
