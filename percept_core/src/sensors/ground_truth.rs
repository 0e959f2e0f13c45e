// percept_core/src/sensors/ground_truth.rs

use super::RateGate;
use crate::error::SensorError;
use crate::messages::PoseReading;
use crate::types::Pose;

/// Republishes the exact pose of its body at a fixed rate. Used as the
/// reference signal when evaluating estimators against the noisy sensors.
#[derive(Debug, Clone)]
pub struct PoseReporter {
    gate: RateGate,
    latest: Option<PoseReading>,
}

impl PoseReporter {
    pub fn new(rate_hz: f64) -> Result<Self, SensorError> {
        Ok(Self {
            gate: RateGate::new(rate_hz)?,
            latest: None,
        })
    }

    pub fn latest(&self) -> Option<&PoseReading> {
        self.latest.as_ref()
    }

    pub fn update(
        &mut self,
        now: f64,
        pose: Option<&Pose>,
    ) -> Result<Option<&PoseReading>, SensorError> {
        if !self.gate.is_due(now) {
            return Ok(None);
        }
        let pose = pose.ok_or(SensorError::MissingCollaborator("pose source"))?;
        self.gate.mark(now);
        self.latest = Some(PoseReading {
            timestamp: now,
            pose: pose.renormalized(),
        });
        Ok(self.latest.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, UnitQuaternion};

    #[test]
    fn reports_pose_at_rate() {
        let mut reporter = PoseReporter::new(2.0).unwrap();
        let pose = Pose::new(
            Point3::new(3.0, 4.0, 5.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, 1.0),
        );
        let emitted = (0..20)
            .filter(|k| {
                let now = *k as f64 * 0.1;
                reporter.update(now, Some(&pose)).unwrap().is_some()
            })
            .count();
        assert_eq!(emitted, 4);
        assert_eq!(reporter.latest().unwrap().pose.position, pose.position);
    }

    #[test]
    fn missing_pose_is_an_error() {
        let mut reporter = PoseReporter::new(2.0).unwrap();
        assert_eq!(
            reporter.update(0.0, None).unwrap_err(),
            SensorError::MissingCollaborator("pose source")
        );
        assert!(reporter.latest().is_none());
    }
}
