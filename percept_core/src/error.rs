// percept_core/src/error.rs

use thiserror::Error;

/// Every failure a sensor pipeline can report.
///
/// Scan misses are not errors and noise application never fails, so neither
/// has a variant here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    /// Bad grid, range, rate or reference parameters. Fatal at setup: the
    /// owning sensor must not start.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The clock went backwards between two consecutive samples.
    #[error("non-monotonic time: previous sample at {previous}s, current at {current}s")]
    NonMonotonicTime { previous: f64, current: f64 },

    /// A collaborator (pose source, scene oracle) was not available for this tick.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// A sentence could not be framed or its checksum did not match.
    #[error("malformed sentence: {0}")]
    MalformedSentence(String),
}

impl SensorError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SensorError::InvalidConfiguration(msg.into())
    }
}
