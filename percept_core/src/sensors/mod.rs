// percept_core/src/sensors/mod.rs

//! Per-sensor orchestration.
//!
//! Each sensor wraps one core model with a [`RateGate`] and keeps its last
//! good output. A driver calls `update` once per tick and receives
//! `Ok(None)` when the sensor is not due, `Ok(Some(..))` for a fresh
//! measurement, or an error that leaves the previous output in place.

pub mod gps;
pub mod ground_truth;
pub mod imu;
pub mod lidar;

use crate::error::SensorError;

const GATE_TOLERANCE: f64 = 1e-9;

/// Decides when a sensor running at a fixed rate is due. Ticks that arrive
/// late are not made up for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateGate {
    period: f64,
    last: Option<f64>,
}

impl RateGate {
    pub fn new(rate_hz: f64) -> Result<Self, SensorError> {
        if !rate_hz.is_finite() || rate_hz <= 0.0 {
            return Err(SensorError::invalid(format!(
                "update rate must be positive and finite, got {rate_hz}"
            )));
        }
        Ok(Self {
            period: 1.0 / rate_hz,
            last: None,
        })
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn rate_hz(&self) -> f64 {
        1.0 / self.period
    }

    pub fn is_due(&self, now: f64) -> bool {
        match self.last {
            None => true,
            Some(last) => now - last >= self.period - GATE_TOLERANCE,
        }
    }

    /// Records that a measurement was emitted at `now`.
    pub fn mark(&mut self, now: f64) {
        self.last = Some(now);
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
