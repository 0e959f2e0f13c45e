// percept_sim/src/simulation/plugins/sensors/lidar.rs
use avian3d::prelude::{SpatialQuery, SpatialQueryFilter};
use bevy::prelude::*;
use nalgebra::{Point3, UnitVector3};

// --- Simulation Crate Imports ---
use super::{measurement_event, spawn_sensor_child};
use crate::prelude::*;
use crate::simulation::core::components::{GroundTruthState, SensorMount};
use crate::simulation::core::events::MeasurementEvent;
use crate::simulation::core::transforms::enu_vector_to_bevy_vector;

// --- Core Library Imports ---
use percept_core::{
    messages::MeasurementData, sensors::lidar::Lidar3d, types::SceneQuery,
};

// =========================================================================
// == Components & Plugin ==
// =========================================================================

#[derive(Component)]
pub struct LidarSensor(pub Lidar3d);

pub struct LidarPlugin;

impl Plugin for LidarPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_lidar_sensors.in_set(SceneBuildSet::ProcessSensors),
        )
        .add_systems(
            FixedUpdate,
            lidar_sensor_system.in_set(SimulationSet::Sensors),
        );
    }
}

// =========================================================================
// == Scene Query Adapter ==
// =========================================================================

/// Answers ENU ray queries with avian3d ray casts, ignoring the agent that
/// carries the sensor.
pub struct AvianScene<'a, 'w, 's> {
    spatial_query: &'a SpatialQuery<'w, 's>,
    filter: SpatialQueryFilter,
}

impl<'a, 'w, 's> AvianScene<'a, 'w, 's> {
    pub fn new(spatial_query: &'a SpatialQuery<'w, 's>, owner: Entity) -> Self {
        Self {
            spatial_query,
            filter: SpatialQueryFilter::from_excluded_entities([owner]),
        }
    }
}

impl SceneQuery for AvianScene<'_, '_, '_> {
    fn intersect(
        &self,
        origin: &Point3<f64>,
        direction: &UnitVector3<f64>,
        max_distance: f64,
    ) -> Option<f64> {
        let dir = Dir3::new(enu_vector_to_bevy_vector(direction.as_ref())).ok()?;
        self.spatial_query
            .cast_ray(
                enu_vector_to_bevy_vector(&origin.coords),
                dir,
                max_distance as f32,
                true,
                &self.filter,
            )
            .map(|hit| hit.distance as f64)
    }
}

// =========================================================================
// == Spawning System ==
// =========================================================================

fn spawn_lidar_sensors(
    mut commands: Commands,
    request_query: Query<(Entity, &Name, &SpawnAgentConfigRequest)>,
) {
    for (agent_entity, agent_name, request) in &request_query {
        for sensor_config in &request.0.sensors {
            let SensorConfig::Lidar(lidar_config) = sensor_config else {
                continue;
            };

            let lidar = match Lidar3d::new(lidar_config.grid.clone(), lidar_config.rate) {
                Ok(lidar) => lidar,
                Err(e) => {
                    error!(
                        "  -> LiDAR '{}' on agent '{}' not spawned: {}",
                        lidar_config.name,
                        agent_name.as_str(),
                        e
                    );
                    continue;
                }
            };

            info!(
                "  -> Spawning LiDAR '{}' ({} layers x {} samples, {:.2} x {:.2} deg) on agent '{}' at {:.1} Hz",
                lidar_config.name,
                lidar.engine().grid().layers,
                lidar.engine().grid().samples,
                lidar.engine().layer_increment(),
                lidar.engine().azimuth_increment(),
                agent_name.as_str(),
                lidar.gate().rate_hz()
            );
            spawn_sensor_child(
                &mut commands,
                agent_entity,
                &lidar_config.name,
                &lidar_config.transform,
                LidarSensor(lidar),
            );
        }
    }
}

// =========================================================================
// == Runtime System ==
// =========================================================================

fn lidar_sensor_system(
    mut measurement_writer: EventWriter<MeasurementEvent>,
    time: Res<Time>,
    spatial_query: SpatialQuery,
    agent_query: Query<(Entity, &GroundTruthState, &Children)>,
    mut sensor_query: Query<(Entity, &SensorMount, &mut LidarSensor)>,
) {
    let now = time.elapsed_secs_f64();

    for (agent_entity, ground_truth, children) in &agent_query {
        for &child_entity in children {
            let Ok((sensor_entity, mount, mut lidar)) = sensor_query.get_mut(child_entity) else {
                continue;
            };

            let pose = mount.truth_at_mount(&ground_truth.0).pose;
            let scene = AvianScene::new(&spatial_query, agent_entity);
            match lidar.0.update(now, Some(&pose), Some(&scene as &dyn SceneQuery)) {
                Ok(Some(scan)) => {
                    measurement_writer.write(measurement_event(
                        agent_entity,
                        sensor_entity,
                        now,
                        MeasurementData::PointCloud(scan.clone()),
                    ));
                }
                Ok(None) => {}
                Err(e) => warn!("LiDAR {:?} skipped a sweep: {}", sensor_entity, e),
            }
        }
    }
}
