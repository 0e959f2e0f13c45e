// percept_core/src/models/kinematics.rs

use crate::error::SensorError;
use crate::types::Pose;
use nalgebra::Vector3;

/// Steps shorter than this (seconds) are treated as "no time has passed".
pub const MIN_TIME_STEP: f64 = 1e-9;

/// First and second derivatives of a pose history at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KinematicSample {
    pub timestamp: f64,
    /// Time since the previous accepted pose.
    pub dt: f64,
    pub linear_velocity_world: Vector3<f64>,
    pub linear_velocity_body: Vector3<f64>,
    pub linear_acceleration_world: Vector3<f64>,
    pub angular_velocity_body: Vector3<f64>,
}

#[derive(Debug, Clone, Copy)]
struct Baseline {
    pose: Pose,
    timestamp: f64,
    velocity: Option<Vector3<f64>>,
}

/// Finite-difference estimator of velocity, acceleration and body rates.
///
/// Owns the previous pose, timestamp and velocity. Time must not run
/// backwards; a step shorter than [`MIN_TIME_STEP`] repeats the last sample
/// and leaves the baseline where it is.
#[derive(Debug, Clone, Default)]
pub struct KinematicDifferentiator {
    baseline: Option<Baseline>,
    latest: KinematicSample,
}

impl KinematicDifferentiator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the baseline pose and clears any derived state.
    pub fn initialize(&mut self, pose: Pose, timestamp: f64) {
        self.baseline = Some(Baseline {
            pose,
            timestamp,
            velocity: None,
        });
        self.latest = KinematicSample {
            timestamp,
            ..Default::default()
        };
    }

    pub fn is_initialized(&self) -> bool {
        self.baseline.is_some()
    }

    /// The most recent sample produced by `step` or `initialize`.
    pub fn latest(&self) -> &KinematicSample {
        &self.latest
    }

    pub fn step(&mut self, pose: Pose, timestamp: f64) -> Result<KinematicSample, SensorError> {
        let Some(prev) = self.baseline else {
            self.initialize(pose, timestamp);
            return Ok(self.latest);
        };

        if timestamp < prev.timestamp {
            return Err(SensorError::NonMonotonicTime {
                previous: prev.timestamp,
                current: timestamp,
            });
        }

        let dt = timestamp - prev.timestamp;
        if dt < MIN_TIME_STEP {
            return Ok(self.latest);
        }

        let velocity_world = (pose.position - prev.pose.position) / dt;
        let velocity_body = pose.orientation.inverse_transform_vector(&velocity_world);
        let acceleration_world = match prev.velocity {
            Some(prev_velocity) => (velocity_world - prev_velocity) / dt,
            None => Vector3::zeros(),
        };
        let delta = prev.pose.orientation.inverse() * pose.orientation;
        let angular_velocity_body = delta.scaled_axis() / dt;

        self.latest = KinematicSample {
            timestamp,
            dt,
            linear_velocity_world: velocity_world,
            linear_velocity_body: velocity_body,
            linear_acceleration_world: acceleration_world,
            angular_velocity_body,
        };
        self.baseline = Some(Baseline {
            pose,
            timestamp,
            velocity: Some(velocity_world),
        });
        Ok(self.latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Point3, UnitQuaternion};

    fn at(x: f64, y: f64, z: f64) -> Pose {
        Pose::new(Point3::new(x, y, z), UnitQuaternion::identity())
    }

    #[test]
    fn first_step_initializes_and_returns_zero() {
        let mut diff = KinematicDifferentiator::new();
        assert!(!diff.is_initialized());
        let s = diff.step(at(1.0, 2.0, 3.0), 5.0).unwrap();
        assert!(diff.is_initialized());
        assert_eq!(s.timestamp, 5.0);
        assert_eq!(s.linear_velocity_world, Vector3::zeros());
        assert_eq!(s.angular_velocity_body, Vector3::zeros());
    }

    #[test]
    fn constant_velocity_has_zero_acceleration() {
        let mut diff = KinematicDifferentiator::new();
        diff.initialize(at(0.0, 0.0, 0.0), 0.0);
        let v = Vector3::new(2.0, -1.0, 0.5);
        let dt = 0.01;
        let mut last = KinematicSample::default();
        for k in 1..=50 {
            let t = k as f64 * dt;
            let p = v * t;
            last = diff.step(at(p.x, p.y, p.z), t).unwrap();
            assert_abs_diff_eq!(last.linear_velocity_world, v, epsilon = 1e-9);
            if k == 1 {
                assert_eq!(last.linear_acceleration_world, Vector3::zeros());
            }
        }
        assert_abs_diff_eq!(last.linear_acceleration_world, Vector3::zeros(), epsilon = 1e-6);
    }

    #[test]
    fn constant_acceleration_is_recovered() {
        let mut diff = KinematicDifferentiator::new();
        let a = 3.0;
        diff.initialize(at(0.0, 0.0, 0.0), 0.0);
        let dt = 0.005;
        let mut last = KinematicSample::default();
        for k in 1..=200 {
            let t = k as f64 * dt;
            last = diff.step(at(0.5 * a * t * t, 0.0, 0.0), t).unwrap();
        }
        assert_abs_diff_eq!(last.linear_acceleration_world.x, a, epsilon = 1e-6);
    }

    #[test]
    fn body_velocity_uses_current_orientation() {
        let mut diff = KinematicDifferentiator::new();
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        diff.initialize(Pose::new(Point3::origin(), yaw), 0.0);
        // Moving north while facing north reads as forward motion.
        let s = diff.step(Pose::new(Point3::new(0.0, 1.0, 0.0), yaw), 1.0).unwrap();
        assert_abs_diff_eq!(s.linear_velocity_body, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn yaw_rate_is_recovered() {
        let mut diff = KinematicDifferentiator::new();
        let rate = 0.4;
        let dt = 0.01;
        diff.initialize(Pose::identity(), 0.0);
        let mut last = KinematicSample::default();
        for k in 1..=10 {
            let t = k as f64 * dt;
            let q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), rate * t);
            last = diff.step(Pose::new(Point3::origin(), q), t).unwrap();
        }
        assert_abs_diff_eq!(last.angular_velocity_body, Vector3::new(0.0, 0.0, rate), epsilon = 1e-9);
    }

    #[test]
    fn zero_dt_holds_previous_sample() {
        let mut diff = KinematicDifferentiator::new();
        diff.initialize(at(0.0, 0.0, 0.0), 0.0);
        let s1 = diff.step(at(1.0, 0.0, 0.0), 1.0).unwrap();
        let s2 = diff.step(at(50.0, 0.0, 0.0), 1.0).unwrap();
        assert_eq!(s1, s2);
        assert!(s2.linear_velocity_world.iter().all(|v| v.is_finite()));

        // The baseline did not move, so the next step differences against x = 1.
        let s3 = diff.step(at(2.0, 0.0, 0.0), 2.0).unwrap();
        assert_abs_diff_eq!(s3.linear_velocity_world.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn time_going_backwards_is_rejected() {
        let mut diff = KinematicDifferentiator::new();
        diff.initialize(at(0.0, 0.0, 0.0), 2.0);
        let err = diff.step(at(1.0, 0.0, 0.0), 1.0).unwrap_err();
        assert_eq!(
            err,
            SensorError::NonMonotonicTime {
                previous: 2.0,
                current: 1.0
            }
        );
        // Baseline untouched.
        let s = diff.step(at(1.0, 0.0, 0.0), 3.0).unwrap();
        assert_abs_diff_eq!(s.linear_velocity_world.x, 1.0, epsilon = 1e-12);
    }
}
