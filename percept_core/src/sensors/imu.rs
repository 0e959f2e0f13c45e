// percept_core/src/sensors/imu.rs

use super::RateGate;
use crate::error::SensorError;
use crate::messages::ImuReading;
use crate::models::kinematics::KinematicDifferentiator;
use crate::noise::{Bias, Gaussian};
use crate::types::GroundTruth;
use nalgebra::{Quaternion, UnitQuaternion, Vector3, Vector4};
use serde::Deserialize;

/// Per-channel perturbation settings. Quaternion channels are ordered
/// x, y, z, w.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NoiseProfile {
    pub gaussian_enabled: bool,
    pub bias_enabled: bool,
    pub orientation_sigma: Vector4<f64>,
    pub orientation_bias: Vector4<f64>,
    pub angular_velocity_sigma: Vector3<f64>,
    pub angular_velocity_bias: Vector3<f64>,
    pub linear_acceleration_sigma: Vector3<f64>,
    pub linear_acceleration_bias: Vector3<f64>,
}

impl NoiseProfile {
    pub fn validate(&self) -> Result<(), SensorError> {
        let sigmas = self
            .orientation_sigma
            .iter()
            .chain(self.angular_velocity_sigma.iter())
            .chain(self.linear_acceleration_sigma.iter());
        if sigmas.copied().any(|s| !s.is_finite() || s < 0.0) {
            return Err(SensorError::invalid("noise sigmas must be finite and >= 0"));
        }

        let biases = self
            .orientation_bias
            .iter()
            .chain(self.angular_velocity_bias.iter())
            .chain(self.linear_acceleration_bias.iter());
        if biases.copied().any(|b| !b.is_finite()) {
            return Err(SensorError::invalid("noise biases must be finite"));
        }
        Ok(())
    }
}

/// One independent Gaussian stream per output channel.
#[derive(Debug, Clone)]
struct ChannelNoise {
    orientation: Gaussian,
    angular_velocity: Gaussian,
    linear_acceleration: Gaussian,
}

impl ChannelNoise {
    fn seeded(seed: u64) -> Self {
        Self {
            orientation: Gaussian::seeded_stream(seed, 0),
            angular_velocity: Gaussian::seeded_stream(seed, 1),
            linear_acceleration: Gaussian::seeded_stream(seed, 2),
        }
    }
}

/// A six-axis IMU with an orientation output.
///
/// Reads specific force, so a body at rest measures +|g| on its up axis.
#[derive(Debug, Clone)]
pub struct Imu {
    profile: NoiseProfile,
    gravity: Vector3<f64>,
    differentiator: KinematicDifferentiator,
    gate: RateGate,
    noise: ChannelNoise,
    latest: Option<ImuReading>,
}

impl Imu {
    /// `gravity` is the world-frame gravitational acceleration (ENU, so
    /// typically `[0, 0, -9.81]`).
    pub fn new(
        profile: NoiseProfile,
        rate_hz: f64,
        gravity: Vector3<f64>,
        seed: u64,
    ) -> Result<Self, SensorError> {
        profile.validate()?;
        if gravity.iter().any(|g| !g.is_finite()) {
            return Err(SensorError::invalid("gravity must be finite"));
        }
        Ok(Self {
            profile,
            gravity,
            differentiator: KinematicDifferentiator::new(),
            gate: RateGate::new(rate_hz)?,
            noise: ChannelNoise::seeded(seed),
            latest: None,
        })
    }

    pub fn profile(&self) -> &NoiseProfile {
        &self.profile
    }

    pub fn latest(&self) -> Option<&ImuReading> {
        self.latest.as_ref()
    }

    pub fn update(
        &mut self,
        now: f64,
        truth: Option<&GroundTruth>,
    ) -> Result<Option<&ImuReading>, SensorError> {
        if !self.gate.is_due(now) {
            return Ok(None);
        }
        let truth = truth.ok_or(SensorError::MissingCollaborator("pose source"))?;
        let sample = self.differentiator.step(truth.pose, now)?;
        let rotation = truth.pose.orientation;

        let angular_velocity = match truth.angular_velocity {
            Some(world) => rotation.inverse_transform_vector(&world),
            None => sample.angular_velocity_body,
        };
        let specific_force =
            rotation.inverse_transform_vector(&(sample.linear_acceleration_world - self.gravity));

        let reading = ImuReading {
            timestamp: now,
            orientation: self.perturb_orientation(rotation),
            angular_velocity: self.perturb(Channel::AngularVelocity, angular_velocity),
            linear_acceleration: self.perturb(Channel::LinearAcceleration, specific_force),
        };

        self.gate.mark(now);
        self.latest = Some(reading);
        Ok(self.latest.as_ref())
    }

    fn perturb(&mut self, channel: Channel, value: Vector3<f64>) -> Vector3<f64> {
        let (gaussian, sigma, bias) = match channel {
            Channel::AngularVelocity => (
                &mut self.noise.angular_velocity,
                &self.profile.angular_velocity_sigma,
                &self.profile.angular_velocity_bias,
            ),
            Channel::LinearAcceleration => (
                &mut self.noise.linear_acceleration,
                &self.profile.linear_acceleration_sigma,
                &self.profile.linear_acceleration_bias,
            ),
        };
        let mut out = value;
        if self.profile.gaussian_enabled {
            out = gaussian.apply_vector(&out, sigma);
        }
        if self.profile.bias_enabled {
            out = Bias::apply_vector(&out, bias);
        }
        out
    }

    /// Perturbs the raw quaternion components, then projects back onto the
    /// unit sphere. A perturbation that collapses the quaternion falls back
    /// to the true orientation.
    fn perturb_orientation(&mut self, rotation: UnitQuaternion<f64>) -> UnitQuaternion<f64> {
        let mut coords = rotation.into_inner().coords;
        if self.profile.gaussian_enabled {
            coords = self
                .noise
                .orientation
                .apply_vector(&coords, &self.profile.orientation_sigma);
        }
        if self.profile.bias_enabled {
            coords = Bias::apply_vector(&coords, &self.profile.orientation_bias);
        }
        UnitQuaternion::try_new(Quaternion::from_vector(coords), 1e-9).unwrap_or(rotation)
    }
}

#[derive(Debug, Clone, Copy)]
enum Channel {
    AngularVelocity,
    LinearAcceleration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pose;
    use approx::assert_abs_diff_eq;
    use nalgebra::Point3;
    use std::f64::consts::FRAC_PI_2;

    const G: f64 = 9.81;

    fn gravity() -> Vector3<f64> {
        Vector3::new(0.0, 0.0, -G)
    }

    fn at_rest(orientation: UnitQuaternion<f64>) -> GroundTruth {
        GroundTruth::from_pose(Pose::new(Point3::new(1.0, 2.0, 0.0), orientation))
    }

    #[test]
    fn level_body_at_rest_reads_plus_g_up() {
        let mut imu = Imu::new(NoiseProfile::default(), 100.0, gravity(), 1).unwrap();
        assert_eq!(imu.profile(), &NoiseProfile::default());
        let truth = at_rest(UnitQuaternion::identity());
        for k in 0..5 {
            imu.update(k as f64 * 0.01, Some(&truth)).unwrap();
        }
        let r = imu.latest().unwrap();
        assert_abs_diff_eq!(r.linear_acceleration, Vector3::new(0.0, 0.0, G), epsilon = 1e-9);
        assert_abs_diff_eq!(r.angular_velocity, Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn pitched_body_sees_gravity_on_forward_axis() {
        // Nose down by 90°: body +x points at world -z.
        let nose_down = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        let mut imu = Imu::new(NoiseProfile::default(), 100.0, gravity(), 1).unwrap();
        let r = *imu.update(0.0, Some(&at_rest(nose_down))).unwrap().unwrap();
        assert_abs_diff_eq!(r.linear_acceleration, Vector3::new(-G, 0.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn physics_angular_velocity_is_rotated_into_body_frame() {
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let mut truth = at_rest(yaw);
        truth.angular_velocity = Some(Vector3::new(1.0, 0.0, 0.0));
        let mut imu = Imu::new(NoiseProfile::default(), 100.0, gravity(), 1).unwrap();
        let r = *imu.update(0.0, Some(&truth)).unwrap().unwrap();
        // World +x is the body's right side (-y) after a 90° left yaw.
        assert_abs_diff_eq!(r.angular_velocity, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn disabled_noise_leaves_readings_exact() {
        let profile = NoiseProfile {
            gaussian_enabled: false,
            bias_enabled: false,
            angular_velocity_sigma: Vector3::repeat(5.0),
            angular_velocity_bias: Vector3::repeat(5.0),
            ..NoiseProfile::default()
        };
        let mut imu = Imu::new(profile, 100.0, gravity(), 1).unwrap();
        let r = *imu.update(0.0, Some(&at_rest(UnitQuaternion::identity()))).unwrap().unwrap();
        assert_eq!(r.angular_velocity, Vector3::zeros());
    }

    #[test]
    fn bias_uses_bias_vectors() {
        let profile = NoiseProfile {
            bias_enabled: true,
            angular_velocity_sigma: Vector3::repeat(100.0),
            angular_velocity_bias: Vector3::new(0.1, 0.2, 0.3),
            linear_acceleration_bias: Vector3::new(0.0, 0.0, -0.5),
            ..NoiseProfile::default()
        };
        let mut imu = Imu::new(profile, 100.0, gravity(), 1).unwrap();
        let r = *imu.update(0.0, Some(&at_rest(UnitQuaternion::identity()))).unwrap().unwrap();
        assert_abs_diff_eq!(r.angular_velocity, Vector3::new(0.1, 0.2, 0.3), epsilon = 1e-12);
        assert_abs_diff_eq!(r.linear_acceleration.z, G - 0.5, epsilon = 1e-9);
    }

    #[test]
    fn noisy_orientation_stays_unit_and_is_seed_reproducible() {
        let profile = NoiseProfile {
            gaussian_enabled: true,
            orientation_sigma: Vector4::repeat(0.05),
            angular_velocity_sigma: Vector3::repeat(0.01),
            linear_acceleration_sigma: Vector3::repeat(0.1),
            ..NoiseProfile::default()
        };
        let truth = at_rest(UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3));
        let mut a = Imu::new(profile.clone(), 100.0, gravity(), 7).unwrap();
        let mut b = Imu::new(profile, 100.0, gravity(), 7).unwrap();
        for k in 0..20 {
            let now = k as f64 * 0.01;
            let ra = *a.update(now, Some(&truth)).unwrap().unwrap();
            let rb = *b.update(now, Some(&truth)).unwrap().unwrap();
            assert_eq!(ra, rb);
            assert_abs_diff_eq!(ra.orientation.quaternion().norm(), 1.0, epsilon = 1e-12);
            assert!(ra.orientation.angle_to(&truth.pose.orientation) > 0.0);
        }
    }

    #[test]
    fn channels_draw_from_independent_streams() {
        let profile = NoiseProfile {
            gaussian_enabled: true,
            angular_velocity_sigma: Vector3::repeat(1.0),
            linear_acceleration_sigma: Vector3::repeat(1.0),
            ..NoiseProfile::default()
        };
        let mut imu = Imu::new(profile, 100.0, Vector3::zeros(), 11).unwrap();
        let r = *imu.update(0.0, Some(&at_rest(UnitQuaternion::identity()))).unwrap().unwrap();
        assert_ne!(r.angular_velocity, r.linear_acceleration);
    }

    #[test]
    fn missing_truth_keeps_previous_reading() {
        let mut imu = Imu::new(NoiseProfile::default(), 100.0, gravity(), 1).unwrap();
        imu.update(0.0, Some(&at_rest(UnitQuaternion::identity()))).unwrap();
        let before = imu.latest().copied();
        let err = imu.update(0.01, None).unwrap_err();
        assert_eq!(err, SensorError::MissingCollaborator("pose source"));
        assert_eq!(imu.latest().copied(), before);
    }

    #[test]
    fn invalid_profiles_are_rejected() {
        let profile = NoiseProfile {
            linear_acceleration_sigma: Vector3::new(-1.0, 0.0, 0.0),
            ..NoiseProfile::default()
        };
        assert!(Imu::new(profile, 100.0, gravity(), 1).is_err());
        assert!(Imu::new(NoiseProfile::default(), -5.0, gravity(), 1).is_err());
    }
}
