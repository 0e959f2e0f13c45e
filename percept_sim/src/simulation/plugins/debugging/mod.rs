// percept_sim/src/simulation/plugins/debugging/mod.rs

use bevy::prelude::*;
use percept_core::messages::MeasurementData;
use percept_core::types::FrameHandle;

use crate::prelude::{AppState, SimulationSet};
use crate::simulation::core::events::MeasurementEvent;

/// Logs every measurement the sensors publish. Point clouds are summarised;
/// GNSS reports are printed as their NMEA sentences.
pub struct MeasurementLogPlugin;

impl Plugin for MeasurementLogPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            log_measurements
                .in_set(SimulationSet::Reporting)
                .run_if(in_state(AppState::Running)),
        );
    }
}

/// The sensor's `Name` when it still has one, its raw handle otherwise.
fn sensor_label(name: Option<&Name>, handle: FrameHandle) -> String {
    match name {
        Some(name) => name.as_str().to_string(),
        None => format!("{handle:?}"),
    }
}

fn log_measurements(mut reader: EventReader<MeasurementEvent>, names: Query<&Name>) {
    for MeasurementEvent(message) in reader.read() {
        let sensor = sensor_label(
            names.get(message.sensor_handle.to_entity()).ok(),
            message.sensor_handle,
        );
        match &message.data {
            MeasurementData::PointCloud(scan) => debug!(
                "[{:.3}] LiDAR '{}': {}/{} returns",
                message.timestamp,
                sensor,
                scan.hit_count(),
                scan.beam_count()
            ),
            MeasurementData::Imu(reading) => debug!(
                "[{:.3}] IMU '{}': gyro {:?} accel {:?}",
                message.timestamp,
                sensor,
                reading.angular_velocity.as_slice(),
                reading.linear_acceleration.as_slice()
            ),
            MeasurementData::Gnss(report) => {
                for sentence in report.sentences.iter() {
                    debug!("[{:.3}] GPS '{}': {}", message.timestamp, sensor, sentence);
                }
            }
            MeasurementData::Pose(reading) => debug!(
                "[{:.3}] Pose '{}': {:?}",
                message.timestamp,
                sensor,
                reading.pose.position.coords.as_slice()
            ),
        }
    }
}
