// percept_sim/src/simulation/core/transforms.rs

use bevy::prelude::{Quat as BevyQuat, Transform as BevyTransform, Vec3 as BevyVec3};
use nalgebra::{Point3, Quaternion, UnitQuaternion, Vector3};
use percept_core::types::Pose;
use std::f64::consts::FRAC_PI_2;

// =========================================================================
// == ENU <-> Bevy Coordinate Conversion ==
// =========================================================================
//
// ENU: x = East, y = North, z = Up. Bevy: x = right, y = up, z = towards the
// viewer. East maps to Bevy +X, North to Bevy -Z and Up to Bevy +Y.

/// Rotation taking ENU basis vectors to their Bevy-world coordinates: a
/// -90 degree rotation about the shared X axis.
pub fn enu_to_bevy_frame() -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2)
}

/// Converts a 3D coordinate vector from ENU to Bevy world.
pub fn enu_vector_to_bevy_vector(enu_vec: &Vector3<f64>) -> BevyVec3 {
    BevyVec3::new(
        enu_vec.x as f32,  // East -> Bevy X
        enu_vec.z as f32,  // Up -> Bevy Y
        -enu_vec.y as f32, // North -> Bevy -Z
    )
}

/// Converts a 3D coordinate vector from Bevy world to ENU.
pub fn bevy_vector_to_enu_vector(bevy_vec: &BevyVec3) -> Vector3<f64> {
    Vector3::new(bevy_vec.x as f64, -bevy_vec.z as f64, bevy_vec.y as f64)
}

/// Converts an object's orientation from ENU frame to Bevy world frame.
pub fn enu_quat_to_bevy_quat(enu_obj_quat: &UnitQuaternion<f64>) -> BevyQuat {
    let frame = enu_to_bevy_frame();
    let q = frame * enu_obj_quat * frame.inverse();
    BevyQuat::from_xyzw(
        q.coords.x as f32,
        q.coords.y as f32,
        q.coords.z as f32,
        q.coords.w as f32,
    )
}

/// Converts an object's orientation from Bevy world frame to ENU frame.
pub fn bevy_quat_to_enu_quat(bevy_obj_quat: &BevyQuat) -> UnitQuaternion<f64> {
    // nalgebra's Quaternion::new is w, x, y, z.
    let q = UnitQuaternion::from_quaternion(Quaternion::new(
        bevy_obj_quat.w as f64,
        bevy_obj_quat.x as f64,
        bevy_obj_quat.y as f64,
        bevy_obj_quat.z as f64,
    ));
    let frame = enu_to_bevy_frame();
    frame.inverse() * q * frame
}

pub fn enu_pose_to_bevy_transform(pose: &Pose) -> BevyTransform {
    BevyTransform::from_translation(enu_vector_to_bevy_vector(&pose.position.coords))
        .with_rotation(enu_quat_to_bevy_quat(&pose.orientation))
}

/// Builds an ENU pose from a Bevy-frame position and rotation (for example
/// avian's `Position` and `Rotation`).
pub fn bevy_to_enu_pose(translation: &BevyVec3, rotation: &BevyQuat) -> Pose {
    Pose::new(
        Point3::from(bevy_vector_to_enu_vector(translation)),
        bevy_quat_to_enu_quat(rotation),
    )
}

pub fn bevy_transform_to_enu_pose(transform: &BevyTransform) -> Pose {
    bevy_to_enu_pose(&transform.translation, &transform.rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_bevy_vec3_approx_eq(v1: &BevyVec3, v2: &BevyVec3, epsilon: f32) {
        assert!(
            (v1.x - v2.x).abs() < epsilon
                && (v1.y - v2.y).abs() < epsilon
                && (v1.z - v2.z).abs() < epsilon,
            "{v1:?} != {v2:?}"
        );
    }

    #[test]
    fn test_enu_axes_map_to_bevy_axes() {
        assert_bevy_vec3_approx_eq(
            &enu_vector_to_bevy_vector(&Vector3::x()),
            &BevyVec3::X,
            1e-6,
        );
        assert_bevy_vec3_approx_eq(
            &enu_vector_to_bevy_vector(&Vector3::y()),
            &BevyVec3::NEG_Z,
            1e-6,
        );
        assert_bevy_vec3_approx_eq(
            &enu_vector_to_bevy_vector(&Vector3::z()),
            &BevyVec3::Y,
            1e-6,
        );
    }

    #[test]
    fn test_frame_quaternion_matches_vector_mapping() {
        let v = Vector3::new(1.5, -2.0, 0.25);
        let rotated = enu_to_bevy_frame() * v;
        let mapped = enu_vector_to_bevy_vector(&v);
        assert_abs_diff_eq!(rotated.x as f32, mapped.x, epsilon = 1e-6);
        assert_abs_diff_eq!(rotated.y as f32, mapped.y, epsilon = 1e-6);
        assert_abs_diff_eq!(rotated.z as f32, mapped.z, epsilon = 1e-6);
    }

    #[test]
    fn test_enu_vector_to_bevy_vector_and_back() {
        let v = Vector3::new(10.0, 20.0, 30.0);
        let back = bevy_vector_to_enu_vector(&enu_vector_to_bevy_vector(&v));
        assert_abs_diff_eq!(back, v, epsilon = 1e-5);
    }

    #[test]
    fn test_identity_orientation_maps_to_identity() {
        let q = enu_quat_to_bevy_quat(&UnitQuaternion::identity());
        assert!(q.abs_diff_eq(BevyQuat::IDENTITY, 1e-6));
        let back = bevy_quat_to_enu_quat(&BevyQuat::IDENTITY);
        assert!(back.angle() < 1e-6);
    }

    #[test]
    fn test_enu_yaw_is_bevy_rotation_about_y() {
        // Yaw left (towards North) in ENU is a rotation about Bevy +Y.
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let q = enu_quat_to_bevy_quat(&yaw);
        let expected = BevyQuat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!(q.abs_diff_eq(expected, 1e-6), "{q:?}");

        // The body's forward axis then points North, i.e. Bevy -Z.
        let forward = q * BevyVec3::X;
        assert_bevy_vec3_approx_eq(&forward, &BevyVec3::NEG_Z, 1e-6);
    }

    #[test]
    fn test_pose_round_trip_through_transform() {
        let pose = Pose::new(
            Point3::new(3.0, -4.0, 1.5),
            UnitQuaternion::from_euler_angles(0.1, -0.3, 2.0),
        );
        let back = bevy_transform_to_enu_pose(&enu_pose_to_bevy_transform(&pose));
        assert_abs_diff_eq!(back.position, pose.position, epsilon = 1e-5);
        assert!(back.orientation.angle_to(&pose.orientation) < 1e-5);
    }
}
