use crate::nmea::{GnssMessageSet, GnssSentences};
use crate::types::{FrameHandle, Pose};
use nalgebra::{Point3, UnitQuaternion, Vector3};

// =========================================================================
// == Perception-Specific Data Structures ==
// =========================================================================

/// A dense, fixed-size LiDAR sweep.
///
/// All per-beam arrays have `layers * samples` entries and are indexed with
/// `layer + sample * layers` (row-major by azimuth, columns by layer).
#[derive(Clone, Debug, PartialEq)]
pub struct ScanResult {
    /// The simulation time of the sweep.
    pub timestamp: f64,
    pub layers: usize,
    pub samples: usize,
    /// Azimuth of each sample column, in degrees.
    pub azimuths_deg: Vec<f64>,
    /// Measured distance per beam, clamped to `[0, max_range]`. Misses read
    /// exactly `max_range`.
    pub ranges: Vec<f64>,
    /// Hit point per beam in the world frame.
    pub points: Vec<Point3<f64>>,
    /// `true` where the scene reported a surface, `false` for "no return".
    pub returns: Vec<bool>,
}

impl ScanResult {
    /// Flat index of a beam.
    pub fn index(&self, layer: usize, sample: usize) -> usize {
        layer + sample * self.layers
    }

    pub fn range(&self, layer: usize, sample: usize) -> f64 {
        self.ranges[self.index(layer, sample)]
    }

    pub fn point(&self, layer: usize, sample: usize) -> Point3<f64> {
        self.points[self.index(layer, sample)]
    }

    pub fn beam_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn hit_count(&self) -> usize {
        self.returns.iter().filter(|&&hit| hit).count()
    }
}

// =========================================================================
// == Kinematic Sensor Outputs ==
// =========================================================================

/// One inertial measurement, expressed in the sensor frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImuReading {
    pub timestamp: f64,
    pub orientation: UnitQuaternion<f64>,
    /// rad/s.
    pub angular_velocity: Vector3<f64>,
    /// Specific force in m/s²: reads +g on the up axis at rest.
    pub linear_acceleration: Vector3<f64>,
}

/// The GNSS receiver output for one update: the derived fields and their
/// rendered sentences.
#[derive(Clone, Debug, PartialEq)]
pub struct GnssReport {
    pub timestamp: f64,
    pub messages: GnssMessageSet,
    pub sentences: GnssSentences,
}

impl GnssReport {
    /// The three sentences as they would appear on a serial line.
    pub fn to_wire(&self) -> String {
        self.sentences.to_wire()
    }
}

/// Ground-truth pose republished at a fixed rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseReading {
    pub timestamp: f64,
    pub pose: Pose,
}

// =========================================================================
// == Core Message and Data Enums ==
// =========================================================================

/// A self-describing container for all sensor data.
#[derive(Clone, Debug)]
pub enum MeasurementData {
    PointCloud(ScanResult),
    Imu(ImuReading),
    Gnss(Box<GnssReport>),
    Pose(PoseReading),
}

/// The generic message that carries sensor data out of the core.
#[derive(Clone, Debug)]
pub struct MeasurementMessage {
    pub agent_handle: FrameHandle,
    pub sensor_handle: FrameHandle,
    pub timestamp: f64,
    pub data: MeasurementData,
}
