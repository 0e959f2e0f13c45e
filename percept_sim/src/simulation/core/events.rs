// percept_sim/src/simulation/core/events.rs
use bevy::prelude::Event;
use percept_core::messages::MeasurementMessage;

/// Bevy wrapper around the engine-agnostic measurement envelope.
#[derive(Event, Clone, Debug)]
pub struct MeasurementEvent(pub MeasurementMessage);
