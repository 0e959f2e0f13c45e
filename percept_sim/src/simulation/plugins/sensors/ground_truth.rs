// percept_sim/src/simulation/plugins/sensors/ground_truth.rs
use bevy::prelude::*;

use super::{measurement_event, spawn_sensor_child};
use crate::prelude::*;
use crate::simulation::core::components::{GroundTruthState, SensorMount};
use crate::simulation::core::events::MeasurementEvent;

use percept_core::{messages::MeasurementData, sensors::ground_truth::PoseReporter};

#[derive(Component)]
pub struct PoseSensor(pub PoseReporter);

pub struct GroundTruthPlugin;

impl Plugin for GroundTruthPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_pose_sensors.in_set(SceneBuildSet::ProcessSensors),
        )
        .add_systems(FixedUpdate, pose_sensor_system.in_set(SimulationSet::Sensors));
    }
}

fn spawn_pose_sensors(
    mut commands: Commands,
    request_query: Query<(Entity, &Name, &SpawnAgentConfigRequest)>,
) {
    for (agent_entity, agent_name, request) in &request_query {
        for sensor_config in &request.0.sensors {
            let SensorConfig::GroundTruth(truth_config) = sensor_config else {
                continue;
            };

            let reporter = match PoseReporter::new(truth_config.rate) {
                Ok(reporter) => reporter,
                Err(e) => {
                    error!(
                        "  -> Ground truth '{}' on agent '{}' not spawned: {}",
                        truth_config.name,
                        agent_name.as_str(),
                        e
                    );
                    continue;
                }
            };

            info!(
                "  -> Spawning ground truth '{}' as child of agent '{}' with rate of {:.1} Hz",
                truth_config.name,
                agent_name.as_str(),
                truth_config.rate
            );
            spawn_sensor_child(
                &mut commands,
                agent_entity,
                &truth_config.name,
                &truth_config.transform,
                PoseSensor(reporter),
            );
        }
    }
}

fn pose_sensor_system(
    mut measurement_writer: EventWriter<MeasurementEvent>,
    time: Res<Time>,
    agent_query: Query<(Entity, &GroundTruthState, &Children)>,
    mut sensor_query: Query<(Entity, &SensorMount, &mut PoseSensor)>,
) {
    let now = time.elapsed_secs_f64();

    for (agent_entity, ground_truth, children) in &agent_query {
        for &child_entity in children {
            let Ok((sensor_entity, mount, mut reporter)) = sensor_query.get_mut(child_entity) else {
                continue;
            };

            let pose = ground_truth.0.pose.compose(&mount.0);
            match reporter.0.update(now, Some(&pose)) {
                Ok(Some(reading)) => {
                    measurement_writer.write(measurement_event(
                        agent_entity,
                        sensor_entity,
                        now,
                        MeasurementData::Pose(*reading),
                    ));
                }
                Ok(None) => {}
                Err(e) => warn!("Ground truth {:?} skipped a report: {}", sensor_entity, e),
            }
        }
    }
}
