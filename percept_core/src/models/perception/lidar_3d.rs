// percept_core/src/models/perception/lidar_3d.rs

use crate::error::SensorError;
use crate::messages::ScanResult;
use crate::models::perception::SensorRay;
use crate::types::{Pose, SceneQuery};
use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::Deserialize;

/// Sampling layout of a multi-layer spinning LiDAR.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ScanGrid {
    /// Number of vertical layers. At least 2.
    pub layers: usize,
    /// Number of azimuth samples per layer over 360°. At least 1.
    pub samples: usize,
    /// Lowest elevation, degrees.
    pub angle_min: f64,
    /// Highest elevation, degrees.
    pub angle_max: f64,
    /// Metres.
    pub range_min: f64,
    /// Metres. Misses are reported at this distance.
    pub range_max: f64,
}

impl Default for ScanGrid {
    fn default() -> Self {
        Self {
            layers: 16,
            samples: 360,
            angle_min: -10.0,
            angle_max: 10.0,
            range_min: 0.12,
            range_max: 100.0,
        }
    }
}

impl ScanGrid {
    pub fn validate(&self) -> Result<(), SensorError> {
        if self.samples < 1 {
            return Err(SensorError::invalid("samples must be at least 1"));
        }
        if self.layers < 2 {
            return Err(SensorError::invalid("layers must be at least 2"));
        }
        // Beam ids are u32.
        let beams = self.layers.checked_mul(self.samples);
        if !matches!(beams, Some(n) if n <= u32::MAX as usize) {
            return Err(SensorError::invalid(format!(
                "{} layers x {} samples exceeds the beam limit of {}",
                self.layers,
                self.samples,
                u32::MAX
            )));
        }
        let values = [self.angle_min, self.angle_max, self.range_min, self.range_max];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SensorError::invalid("angles and ranges must be finite"));
        }
        if self.angle_min > self.angle_max {
            return Err(SensorError::invalid(format!(
                "angle_min {} exceeds angle_max {}",
                self.angle_min, self.angle_max
            )));
        }
        if self.range_min > self.range_max {
            return Err(SensorError::invalid(format!(
                "range_min {} exceeds range_max {}",
                self.range_min, self.range_max
            )));
        }
        Ok(())
    }

    pub fn beam_count(&self) -> usize {
        self.layers * self.samples
    }
}

/// Turns a pose and a scene oracle into a dense range/point sweep.
///
/// Everything that depends only on the grid (increments, azimuth table,
/// sensor-frame beam directions) is computed once at construction. Nothing
/// that depends on pose or scene is kept between scans.
#[derive(Debug, Clone)]
pub struct ScanEngine {
    grid: ScanGrid,
    layer_increment: f64,
    azimuth_increment: f64,
    azimuths_deg: Vec<f64>,
    rays: Vec<SensorRay>,
}

impl ScanEngine {
    pub fn new(grid: ScanGrid) -> Result<Self, SensorError> {
        grid.validate()?;

        let layer_increment = (grid.angle_max - grid.angle_min) / (grid.layers - 1) as f64;
        let azimuth_increment = 360.0 / grid.samples as f64;
        let azimuths_deg: Vec<f64> = (0..grid.samples)
            .map(|a| a as f64 * azimuth_increment)
            .collect();

        let mut rays = Vec::with_capacity(grid.beam_count());
        for (a, azimuth) in azimuths_deg.iter().enumerate() {
            for l in 0..grid.layers {
                let elevation = grid.angle_min + l as f64 * layer_increment;
                rays.push(SensorRay {
                    id: (l + a * grid.layers) as u32,
                    direction: beam_direction(*azimuth, elevation),
                });
            }
        }

        Ok(Self {
            grid,
            layer_increment,
            azimuth_increment,
            azimuths_deg,
            rays,
        })
    }

    pub fn grid(&self) -> &ScanGrid {
        &self.grid
    }

    /// Degrees between adjacent layers.
    pub fn layer_increment(&self) -> f64 {
        self.layer_increment
    }

    /// Degrees between adjacent azimuth samples.
    pub fn azimuth_increment(&self) -> f64 {
        self.azimuth_increment
    }

    pub fn azimuths_deg(&self) -> &[f64] {
        &self.azimuths_deg
    }

    /// The scan pattern in the sensor frame, in output order.
    pub fn rays(&self) -> &[SensorRay] {
        &self.rays
    }

    /// Casts every beam from `pose` and returns the full sweep.
    ///
    /// A miss is a valid "no return" and reads `max_range`.
    pub fn scan(&self, pose: &Pose, scene: &dyn SceneQuery, max_range: f64) -> ScanResult {
        let max_range = if max_range.is_finite() { max_range.max(0.0) } else { 0.0 };
        let origin = pose.position;
        let n = self.rays.len();

        let mut ranges = Vec::with_capacity(n);
        let mut points = Vec::with_capacity(n);
        let mut returns = Vec::with_capacity(n);

        for ray in &self.rays {
            let direction = pose.orientation * ray.direction;
            let hit = scene
                .intersect(&origin, &direction, max_range)
                .filter(|d| !d.is_nan());

            let range = match hit {
                Some(distance) => distance.clamp(0.0, max_range),
                None => max_range,
            };
            ranges.push(range);
            points.push(origin + direction.into_inner() * range);
            returns.push(hit.is_some());
        }

        ScanResult {
            timestamp: 0.0,
            layers: self.grid.layers,
            samples: self.grid.samples,
            azimuths_deg: self.azimuths_deg.clone(),
            ranges,
            points,
            returns,
        }
    }
}

/// Sensor-frame unit vector for a beam: yaw `azimuth` about +z, then pitch
/// `-elevation` about +y, applied to the forward axis.
pub fn beam_direction(azimuth_deg: f64, elevation_deg: f64) -> Unit<Vector3<f64>> {
    let yaw = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), azimuth_deg.to_radians());
    let pitch = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -elevation_deg.to_radians());
    (yaw * pitch) * Vector3::x_axis()
}
