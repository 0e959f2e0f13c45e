// percept_sim/src/simulation/plugins/sensors/imu.rs
use bevy::prelude::*;

// --- Simulation Crate Imports ---
use super::{measurement_event, spawn_sensor_child};
use crate::prelude::*;
use crate::simulation::core::components::{GroundTruthState, SensorMount};
use crate::simulation::core::events::MeasurementEvent;
use crate::simulation::core::prng::SimulationRng;

// --- Core Library Imports ---
use percept_core::{messages::MeasurementData, sensors::imu::Imu};

// =========================================================================
// == Components & Plugin ==
// =========================================================================

#[derive(Component)]
pub struct ImuSensor(pub Imu);

pub struct ImuPlugin;

impl Plugin for ImuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_imu_sensors.in_set(SceneBuildSet::ProcessSensors),
        )
        .add_systems(FixedUpdate, imu_sensor_system.in_set(SimulationSet::Sensors));
    }
}

// =========================================================================
// == Spawning System ==
// =========================================================================

fn spawn_imu_sensors(
    mut commands: Commands,
    mut rng: ResMut<SimulationRng>,
    config: Res<ScenarioConfig>,
    request_query: Query<(Entity, &Name, &SpawnAgentConfigRequest)>,
) {
    let gravity = config.world.gravity;

    for (agent_entity, agent_name, request) in &request_query {
        for sensor_config in &request.0.sensors {
            let SensorConfig::Imu(imu_config) = sensor_config else {
                continue;
            };

            // Each IMU draws its own seed so noise streams stay independent
            // and reproducible for a seeded scenario.
            let seed = rng.next_seed();
            let imu = match Imu::new(imu_config.noise.clone(), imu_config.rate, gravity, seed) {
                Ok(imu) => imu,
                Err(e) => {
                    error!(
                        "  -> IMU '{}' on agent '{}' not spawned: {}",
                        imu_config.name,
                        agent_name.as_str(),
                        e
                    );
                    continue;
                }
            };

            info!(
                "  -> Spawning IMU '{}' as child of agent '{}' with rate of {:.1} Hz (noise: {}, bias: {})",
                imu_config.name,
                agent_name.as_str(),
                imu_config.rate,
                imu.profile().gaussian_enabled,
                imu.profile().bias_enabled
            );
            spawn_sensor_child(
                &mut commands,
                agent_entity,
                &imu_config.name,
                &imu_config.transform,
                ImuSensor(imu),
            );
        }
    }
}

// =========================================================================
// == Runtime System ==
// =========================================================================

fn imu_sensor_system(
    mut measurement_writer: EventWriter<MeasurementEvent>,
    time: Res<Time>,
    agent_query: Query<(Entity, &GroundTruthState, &Children)>,
    mut sensor_query: Query<(Entity, &SensorMount, &mut ImuSensor)>,
) {
    let now = time.elapsed_secs_f64();

    for (agent_entity, ground_truth, children) in &agent_query {
        for &child_entity in children {
            let Ok((sensor_entity, mount, mut imu)) = sensor_query.get_mut(child_entity) else {
                continue;
            };

            let sensor_truth = mount.truth_at_mount(&ground_truth.0);
            match imu.0.update(now, Some(&sensor_truth)) {
                Ok(Some(reading)) => {
                    measurement_writer.write(measurement_event(
                        agent_entity,
                        sensor_entity,
                        now,
                        MeasurementData::Imu(*reading),
                    ));
                }
                Ok(None) => {}
                Err(e) => warn!("IMU {:?} skipped a sample: {}", sensor_entity, e),
            }
        }
    }
}
