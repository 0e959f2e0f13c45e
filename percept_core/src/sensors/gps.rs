// percept_core/src/sensors/gps.rs

use super::RateGate;
use crate::error::SensorError;
use crate::geodesy::GeodeticProjector;
use crate::messages::GnssReport;
use crate::models::kinematics::KinematicDifferentiator;
use crate::nmea::{self, GnssConfig, GnssMessageSet};
use crate::types::GroundTruth;
use chrono::{DateTime, TimeDelta, Utc};

/// A GNSS receiver that reports the ground-truth position as NMEA sentences.
///
/// Position comes straight from the pose; speed and course come from the
/// physics velocity when the engine supplies one, otherwise from
/// differencing consecutive fixes.
#[derive(Debug, Clone)]
pub struct GpsReceiver {
    config: GnssConfig,
    projector: GeodeticProjector,
    differentiator: KinematicDifferentiator,
    gate: RateGate,
    epoch: DateTime<Utc>,
    latest: Option<GnssReport>,
}

impl GpsReceiver {
    /// `epoch` is the UTC instant that simulation time zero corresponds to.
    pub fn new(config: GnssConfig, rate_hz: f64, epoch: DateTime<Utc>) -> Result<Self, SensorError> {
        config.validate()?;
        Ok(Self {
            projector: GeodeticProjector::new(config.reference)?,
            config,
            differentiator: KinematicDifferentiator::new(),
            gate: RateGate::new(rate_hz)?,
            epoch,
            latest: None,
        })
    }

    pub fn config(&self) -> &GnssConfig {
        &self.config
    }

    pub fn projector(&self) -> &GeodeticProjector {
        &self.projector
    }

    pub fn latest(&self) -> Option<&GnssReport> {
        self.latest.as_ref()
    }

    /// UTC at simulation time `now`. Saturates to the epoch if the sum is
    /// not representable.
    pub fn utc_at(&self, now: f64) -> DateTime<Utc> {
        let micros = (now * 1e6).round();
        if !micros.is_finite() {
            return self.epoch;
        }
        self.epoch
            .checked_add_signed(TimeDelta::microseconds(micros as i64))
            .unwrap_or(self.epoch)
    }

    pub fn update(
        &mut self,
        now: f64,
        truth: Option<&GroundTruth>,
    ) -> Result<Option<&GnssReport>, SensorError> {
        if !self.gate.is_due(now) {
            return Ok(None);
        }
        let truth = truth.ok_or(SensorError::MissingCollaborator("pose source"))?;

        let sample = self.differentiator.step(truth.pose, now)?;
        let velocity = truth
            .linear_velocity
            .unwrap_or(sample.linear_velocity_world);

        let fix = self.projector.to_geodetic(&truth.pose.position.coords);
        let messages = GnssMessageSet::assemble(self.config.clone(), fix, &velocity, self.utc_at(now));
        let sentences = nmea::encode_all(&messages);

        self.gate.mark(now);
        self.latest = Some(GnssReport {
            timestamp: now,
            messages,
            sentences,
        });
        Ok(self.latest.as_ref())
    }
}
