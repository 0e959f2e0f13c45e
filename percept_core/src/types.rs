// percept_core/src/types.rs

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, UnitVector3, Vector3};

// --- Core Identifier ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameHandle(pub u64);

impl FrameHandle {
    // A convenience method for use in the Bevy adapter crate.
    #[cfg(feature = "bevy")] // This will only compile if the "bevy" feature is enabled
    pub fn from_entity(entity: bevy_ecs::prelude::Entity) -> Self {
        Self(entity.to_bits())
    }

    #[cfg(feature = "bevy")]
    pub fn to_entity(self) -> bevy_ecs::prelude::Entity {
        bevy_ecs::prelude::Entity::from_bits(self.0)
    }
}

// =========================================================================
// == Rigid-Body State ==
// =========================================================================

/// Position and orientation of a body in the world (ENU) frame.
///
/// The orientation rotates vectors from the body frame (x forward, y left,
/// z up) into the world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub fn new(position: Point3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Point3::origin(), UnitQuaternion::identity())
    }

    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        Self::new(Point3::from(iso.translation.vector), iso.rotation)
    }

    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.orientation)
    }

    /// The body's forward axis expressed in the world frame.
    pub fn forward(&self) -> UnitVector3<f64> {
        self.orientation * Vector3::x_axis()
    }

    /// Composes `self` with a pose expressed in this body's frame.
    pub fn compose(&self, local: &Pose) -> Pose {
        Pose::new(
            self.position + self.orientation * local.position.coords,
            self.orientation * local.orientation,
        )
        .renormalized()
    }

    /// Re-projects the orientation onto the unit sphere. Repeated quaternion
    /// products drift, so this runs after every composition.
    pub fn renormalized(mut self) -> Self {
        self.orientation.renormalize();
        self
    }
}

/// The authoritative state of a body for one tick, as supplied by physics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroundTruth {
    pub pose: Pose,
    /// Linear velocity in the world frame, when the physics engine exposes it.
    pub linear_velocity: Option<Vector3<f64>>,
    /// Angular velocity in the world frame, when the physics engine exposes it.
    pub angular_velocity: Option<Vector3<f64>>,
}

impl GroundTruth {
    pub fn from_pose(pose: Pose) -> Self {
        Self {
            pose,
            ..Default::default()
        }
    }
}

// =========================================================================
// == Scene Intersection Collaborator ==
// =========================================================================

/// Answers "how far along this ray is the first surface?".
///
/// Owned by a physics or rendering subsystem; the scan engine treats it as a
/// black box. `None` means nothing was hit within `max_distance`.
pub trait SceneQuery {
    fn intersect(
        &self,
        origin: &Point3<f64>,
        direction: &UnitVector3<f64>,
        max_distance: f64,
    ) -> Option<f64>;
}

impl<F> SceneQuery for F
where
    F: Fn(&Point3<f64>, &UnitVector3<f64>, f64) -> Option<f64>,
{
    fn intersect(
        &self,
        origin: &Point3<f64>,
        direction: &UnitVector3<f64>,
        max_distance: f64,
    ) -> Option<f64> {
        self(origin, direction, max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn forward_axis_follows_yaw() {
        let pose = Pose::new(
            Point3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let fwd = pose.forward();
        assert_abs_diff_eq!(fwd.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fwd.y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fwd.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn compose_keeps_unit_orientation() {
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.1);
        let mut pose = Pose::identity();
        let step = Pose::new(Point3::new(1.0, 0.0, 0.0), yaw);
        for _ in 0..10_000 {
            pose = pose.compose(&step);
        }
        assert_abs_diff_eq!(pose.orientation.quaternion().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn isometry_round_trip() {
        let pose = Pose::new(
            Point3::new(-4.0, 0.5, 2.0),
            UnitQuaternion::from_euler_angles(0.1, -0.2, 0.3),
        );
        let back = Pose::from_isometry(&pose.to_isometry());
        assert_abs_diff_eq!(back.position, pose.position, epsilon = 1e-12);
        assert!(back.orientation.angle_to(&pose.orientation) < 1e-12);
    }

    #[test]
    fn closures_are_scene_queries() {
        let wall = |origin: &Point3<f64>, dir: &UnitVector3<f64>, max: f64| {
            // Plane x = 5.
            if dir.x <= 0.0 {
                return None;
            }
            let d = (5.0 - origin.x) / dir.x;
            (d <= max).then_some(d)
        };
        let hit = wall.intersect(&Point3::origin(), &Vector3::x_axis(), 100.0);
        assert_eq!(hit, Some(5.0));
        assert_eq!(wall.intersect(&Point3::origin(), &Vector3::x_axis(), 1.0), None);
    }
}
