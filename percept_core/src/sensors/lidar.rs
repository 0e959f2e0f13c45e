// percept_core/src/sensors/lidar.rs

use super::RateGate;
use crate::error::SensorError;
use crate::messages::ScanResult;
use crate::models::perception::lidar_3d::{ScanEngine, ScanGrid};
use crate::types::{Pose, SceneQuery};

/// A spinning multi-layer LiDAR: a scan engine behind a rate gate.
#[derive(Debug, Clone)]
pub struct Lidar3d {
    engine: ScanEngine,
    gate: RateGate,
    latest: Option<ScanResult>,
}

impl Lidar3d {
    pub fn new(grid: ScanGrid, rate_hz: f64) -> Result<Self, SensorError> {
        Ok(Self {
            engine: ScanEngine::new(grid)?,
            gate: RateGate::new(rate_hz)?,
            latest: None,
        })
    }

    pub fn engine(&self) -> &ScanEngine {
        &self.engine
    }

    pub fn gate(&self) -> &RateGate {
        &self.gate
    }

    pub fn latest(&self) -> Option<&ScanResult> {
        self.latest.as_ref()
    }

    /// Runs one sweep at the grid's maximum range if the sensor is due.
    pub fn update(
        &mut self,
        now: f64,
        pose: Option<&Pose>,
        scene: Option<&dyn SceneQuery>,
    ) -> Result<Option<&ScanResult>, SensorError> {
        if !self.gate.is_due(now) {
            return Ok(None);
        }
        let pose = pose.ok_or(SensorError::MissingCollaborator("pose source"))?;
        let scene = scene.ok_or(SensorError::MissingCollaborator("scene query"))?;

        let mut scan = self.engine.scan(pose, scene, self.engine.grid().range_max);
        scan.timestamp = now;
        self.gate.mark(now);
        self.latest = Some(scan);
        Ok(self.latest.as_ref())
    }
}
