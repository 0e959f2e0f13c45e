// percept_core/src/prelude.rs

// --- Core Contracts ---
pub use crate::error::SensorError;
pub use crate::types::{FrameHandle, GroundTruth, Pose, SceneQuery};

// --- Messages ---
pub use crate::messages::{
    GnssReport, ImuReading, MeasurementData, MeasurementMessage, PoseReading, ScanResult,
};

// --- Models ---
pub use crate::geodesy::{GeodeticFix, GeodeticProjector};
pub use crate::models::kinematics::{KinematicDifferentiator, KinematicSample};
pub use crate::models::perception::lidar_3d::{ScanEngine, ScanGrid};
pub use crate::nmea::GnssConfig;
pub use crate::noise::{Bias, Gaussian};

// --- Sensors ---
pub use crate::sensors::gps::GpsReceiver;
pub use crate::sensors::ground_truth::PoseReporter;
pub use crate::sensors::imu::{Imu, NoiseProfile};
pub use crate::sensors::lidar::Lidar3d;
pub use crate::sensors::RateGate;
