// percept_sim/src/simulation/plugins/world/spawner.rs
use crate::prelude::*;
use crate::simulation::config::structs::{ObstacleConfig, ObstacleShape};
use avian3d::prelude::*;

/// Thickness of the ground slab; its top face sits at ENU z = 0.
const GROUND_THICKNESS: f32 = 1.0;

pub struct WorldSpawnerPlugin;

impl Plugin for WorldSpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            (spawn_ground, spawn_obstacles).in_set(SceneBuildSet::Physics),
        );
    }
}

fn spawn_ground(mut commands: Commands, config: Res<ScenarioConfig>) {
    let Some(size) = config.world.ground_size else {
        info!("[WORLD] No ground plane configured.");
        return;
    };
    if !size.is_finite() || size <= 0.0 {
        error!("[WORLD] Invalid ground_size {}; no ground spawned.", size);
        return;
    }

    let size = size as f32;
    info!("[WORLD] Spawning {:.0} m ground slab.", size);
    commands.spawn((
        Name::new("Ground"),
        RigidBody::Static,
        Collider::cuboid(size, GROUND_THICKNESS, size),
        Transform::from_xyz(0.0, -GROUND_THICKNESS / 2.0, 0.0),
    ));
}

fn spawn_obstacles(mut commands: Commands, config: Res<ScenarioConfig>) {
    for obstacle in &config.world.obstacles {
        let Some(collider) = obstacle_collider(obstacle) else {
            error!(
                "[WORLD] Obstacle '{}' has invalid dimensions {:?}; skipped.",
                obstacle.name, obstacle.shape
            );
            continue;
        };

        info!("[WORLD] Spawning obstacle '{}'.", obstacle.name);
        commands.spawn((
            Name::new(obstacle.name.clone()),
            RigidBody::Static,
            collider,
            obstacle.pose.to_bevy_transform(),
        ));
    }
}

/// Builds the collider for an obstacle, or `None` when a dimension is not a
/// positive finite number. Extents are given in ENU and mapped onto Bevy's
/// axes (ENU z is Bevy y).
fn obstacle_collider(obstacle: &ObstacleConfig) -> Option<Collider> {
    let valid = |d: f64| d.is_finite() && d > 0.0;
    match obstacle.shape {
        ObstacleShape::Box { size: [x, y, z] } => (valid(x) && valid(y) && valid(z))
            .then(|| Collider::cuboid(x as f32, z as f32, y as f32)),
        ObstacleShape::Sphere { radius } => valid(radius).then(|| Collider::sphere(radius as f32)),
        ObstacleShape::Cylinder { radius, height } => (valid(radius) && valid(height))
            .then(|| Collider::cylinder(radius as f32, height as f32)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::structs::PoseConfig;

    fn obstacle(shape: ObstacleShape) -> ObstacleConfig {
        ObstacleConfig {
            name: "test".to_string(),
            pose: PoseConfig::default(),
            shape,
        }
    }

    #[test]
    fn valid_shapes_build_colliders() {
        assert!(obstacle_collider(&obstacle(ObstacleShape::Box { size: [1.0, 2.0, 3.0] })).is_some());
        assert!(obstacle_collider(&obstacle(ObstacleShape::Sphere { radius: 0.5 })).is_some());
        assert!(
            obstacle_collider(&obstacle(ObstacleShape::Cylinder { radius: 0.3, height: 2.0 }))
                .is_some()
        );
    }

    #[test]
    fn degenerate_shapes_are_rejected() {
        assert!(obstacle_collider(&obstacle(ObstacleShape::Box { size: [1.0, 0.0, 3.0] })).is_none());
        assert!(obstacle_collider(&obstacle(ObstacleShape::Sphere { radius: f64::NAN })).is_none());
        assert!(
            obstacle_collider(&obstacle(ObstacleShape::Cylinder { radius: -1.0, height: 2.0 }))
                .is_none()
        );
    }
}
