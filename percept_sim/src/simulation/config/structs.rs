// percept_sim/src/simulation/config/structs.rs

use bevy::prelude::{Resource, Transform};
use chrono::{DateTime, Utc};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use percept_core::models::perception::lidar_3d::ScanGrid;
use percept_core::nmea::GnssConfig;
use percept_core::sensors::imu::NoiseProfile;
use percept_core::types::Pose;
use serde::Deserialize;

use crate::simulation::core::transforms::enu_pose_to_bevy_transform;
use crate::simulation::utils::serde_helpers;

// =========================================================================
// == Top-Level Configuration Resource ==
// =========================================================================

/// # ScenarioConfig
/// The primary Bevy resource holding all configuration for a simulation run.
/// This struct is the root of the data parsed from a `scenario.toml` file.
/// All vectors and poses are in the ENU world frame (or the FLU body frame
/// for sensor mounts).
#[derive(Resource, Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: SimulationSettings,

    #[serde(default)]
    pub world: WorldConfig,

    // The TOML has `[[agents]]`, which becomes a Vec of AgentConfig structs.
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimulationSettings {
    /// Optional seed for the pseudo-random number generator for determinism.
    pub seed: Option<u64>,
    /// The app exits once this much simulated time has elapsed.
    pub duration_seconds: f64,
    /// Fixed-step frequency in Hz. Sensors cannot run faster than this.
    pub physics_rate: f64,
    /// UTC instant of simulation time zero, as an RFC 3339 string. The wall
    /// clock at startup is used when absent.
    pub utc_epoch: Option<DateTime<Utc>>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: None,
            duration_seconds: 10.0,
            physics_rate: 400.0,
            utc_epoch: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WorldConfig {
    /// Global gravity vector in m/s^2 (ENU).
    #[serde(with = "serde_helpers::vec3_from_array")]
    pub gravity: Vector3<f64>,
    /// Side length of the square ground slab centred on the origin, or no
    /// ground when absent.
    pub ground_size: Option<f64>,
    pub obstacles: Vec<ObstacleConfig>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vector3::new(0.0, 0.0, -9.81),
            ground_size: Some(200.0),
            obstacles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObstacleConfig {
    pub name: String,
    #[serde(default)]
    pub pose: PoseConfig,
    pub shape: ObstacleShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "PascalCase")]
pub enum ObstacleShape {
    /// Full extents along ENU x, y, z.
    Box { size: [f64; 3] },
    Sphere { radius: f64 },
    /// Axis along ENU z.
    Cylinder { radius: f64, height: f64 },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub name: String,
    #[serde(default)]
    pub starting_pose: PoseConfig,
    /// World-frame velocity the kinematic body moves with, m/s.
    #[serde(with = "serde_helpers::vec3_from_array", default)]
    pub linear_velocity: Vector3<f64>,
    /// World-frame angular velocity, written in deg/s.
    #[serde(with = "serde_helpers::vec3_rad_from_deg_array", default)]
    pub angular_velocity: Vector3<f64>,
    /// Collision box extents (length, width, height).
    #[serde(default = "default_body_size")]
    pub body_size: [f64; 3],
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
}

fn default_body_size() -> [f64; 3] {
    [4.5, 1.8, 1.5]
}

// =========================================================================
// == Helper Structs for Nested Configuration ==
// =========================================================================

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PoseConfig {
    #[serde(with = "serde_helpers::vec3_from_array", default)]
    pub translation: Vector3<f64>,

    /// Roll, pitch, yaw in degrees.
    #[serde(with = "serde_helpers::quat_from_euler_deg", default)]
    pub rotation: UnitQuaternion<f64>,
}

impl PoseConfig {
    pub fn to_pose(&self) -> Pose {
        Pose::new(Point3::from(self.translation), self.rotation)
    }

    pub fn to_bevy_transform(&self) -> Transform {
        enu_pose_to_bevy_transform(&self.to_pose())
    }
}

// =========================================================================
// == Sensors ==
// =========================================================================

// The `tag = "kind"` tells Serde to look for a `kind = "..."` field in the
// TOML to decide which variant to parse.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
#[serde(rename_all = "PascalCase")]
pub enum SensorConfig {
    Lidar(LidarConfig),
    Gps(GpsConfig),
    Imu(ImuConfig),
    GroundTruth(GroundTruthConfig),
}

impl SensorConfig {
    pub fn get_kind_str(&self) -> &str {
        match self {
            SensorConfig::Lidar(_) => "Lidar",
            SensorConfig::Gps(_) => "Gps",
            SensorConfig::Imu(_) => "Imu",
            SensorConfig::GroundTruth(_) => "GroundTruth",
        }
    }

    pub fn get_name(&self) -> &str {
        match self {
            SensorConfig::Lidar(c) => &c.name,
            SensorConfig::Gps(c) => &c.name,
            SensorConfig::Imu(c) => &c.name,
            SensorConfig::GroundTruth(c) => &c.name,
        }
    }
}

/// A multi-layer spinning LiDAR.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LidarConfig {
    pub name: String,
    /// Sweeps per second.
    #[serde(default = "default_lidar_rate")]
    pub rate: f64,
    /// Mount pose relative to the agent body.
    #[serde(default)]
    pub transform: PoseConfig,
    #[serde(default)]
    pub grid: ScanGrid,
}

/// A GNSS receiver emitting NMEA sentences.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GpsConfig {
    pub name: String,
    #[serde(default = "default_gps_rate")]
    pub rate: f64,
    /// Antenna pose relative to the agent body.
    #[serde(default)]
    pub transform: PoseConfig,
    #[serde(default)]
    pub gnss: GnssConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImuConfig {
    pub name: String,
    #[serde(default = "default_imu_rate")]
    pub rate: f64,
    #[serde(default)]
    pub transform: PoseConfig,
    #[serde(default)]
    pub noise: NoiseProfile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroundTruthConfig {
    pub name: String,
    #[serde(default = "default_ground_truth_rate")]
    pub rate: f64,
    #[serde(default)]
    pub transform: PoseConfig,
}

fn default_lidar_rate() -> f64 {
    10.0
}

fn default_gps_rate() -> f64 {
    10.0
}

fn default_imu_rate() -> f64 {
    100.0
}

fn default_ground_truth_rate() -> f64 {
    50.0
}
