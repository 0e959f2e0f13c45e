// percept_core/src/models/perception/mod.rs

pub mod lidar_3d;

use nalgebra::{Unit, Vector3};

/// A single beam of a scan pattern, expressed in the SENSOR's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorRay {
    /// Position of this beam in the flattened output arrays.
    pub id: u32,
    pub direction: Unit<Vector3<f64>>,
}
