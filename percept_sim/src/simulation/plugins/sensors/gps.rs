// percept_sim/src/simulation/plugins/sensors/gps.rs
use bevy::prelude::*;

// --- Simulation Crate Imports ---
use super::{measurement_event, spawn_sensor_child};
use crate::prelude::*;
use crate::simulation::core::components::{GroundTruthState, SensorMount};
use crate::simulation::core::events::MeasurementEvent;
use crate::simulation::core::simulation_setup::SimulationEpoch;

// --- Core Library Imports ---
use percept_core::{messages::MeasurementData, sensors::gps::GpsReceiver};

// =========================================================================
// == Components & Plugin ==
// =========================================================================

#[derive(Component)]
pub struct GpsSensor(pub GpsReceiver);

pub struct GpsPlugin;

impl Plugin for GpsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_gps_sensors.in_set(SceneBuildSet::ProcessSensors),
        )
        .add_systems(FixedUpdate, gps_sensor_system.in_set(SimulationSet::Sensors));
    }
}

// =========================================================================
// == Spawning System ==
// =========================================================================

fn spawn_gps_sensors(
    mut commands: Commands,
    epoch: Res<SimulationEpoch>,
    request_query: Query<(Entity, &Name, &SpawnAgentConfigRequest)>,
) {
    for (agent_entity, agent_name, request) in &request_query {
        for sensor_config in &request.0.sensors {
            let SensorConfig::Gps(gps_config) = sensor_config else {
                continue;
            };

            let receiver = match GpsReceiver::new(gps_config.gnss.clone(), gps_config.rate, epoch.0) {
                Ok(receiver) => receiver,
                Err(e) => {
                    error!(
                        "  -> GPS '{}' on agent '{}' not spawned: {}",
                        gps_config.name,
                        agent_name.as_str(),
                        e
                    );
                    continue;
                }
            };

            let reference = receiver.projector().reference();
            info!(
                "  -> Spawning GPS '{}' as child of agent '{}' with rate of {:.1} Hz (origin {:.6}, {:.6})",
                gps_config.name,
                agent_name.as_str(),
                gps_config.rate,
                reference.latitude,
                reference.longitude
            );
            spawn_sensor_child(
                &mut commands,
                agent_entity,
                &gps_config.name,
                &gps_config.transform,
                GpsSensor(receiver),
            );
        }
    }
}

// =========================================================================
// == Runtime System ==
// =========================================================================

fn gps_sensor_system(
    mut measurement_writer: EventWriter<MeasurementEvent>,
    time: Res<Time>,
    agent_query: Query<(Entity, &GroundTruthState, &Children)>,
    mut sensor_query: Query<(Entity, &SensorMount, &mut GpsSensor)>,
) {
    let now = time.elapsed_secs_f64();

    for (agent_entity, ground_truth, children) in &agent_query {
        for &child_entity in children {
            let Ok((sensor_entity, mount, mut gps)) = sensor_query.get_mut(child_entity) else {
                continue;
            };

            let antenna_truth = mount.truth_at_mount(&ground_truth.0);
            match gps.0.update(now, Some(&antenna_truth)) {
                Ok(Some(report)) => {
                    measurement_writer.write(measurement_event(
                        agent_entity,
                        sensor_entity,
                        now,
                        MeasurementData::Gnss(Box::new(report.clone())),
                    ));
                }
                Ok(None) => {}
                Err(e) => warn!("GPS {:?} skipped a fix: {}", sensor_entity, e),
            }
        }
    }
}
