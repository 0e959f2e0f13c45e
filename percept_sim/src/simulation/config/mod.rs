// percept_sim/src/simulation/config/mod.rs

//! Loading and validating scenario configuration from disk.

pub mod structs;

use figment::{
    providers::{Format, Toml},
    Figment,
};
use std::path::Path;

pub use structs::{AgentConfig, ScenarioConfig, SensorConfig};

/// Reads a scenario TOML file.
///
/// A missing file is an error rather than an empty scenario.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, figment::Error> {
    if !path.is_file() {
        return Err(figment::Error::from(format!(
            "scenario file '{}' does not exist",
            path.display()
        )));
    }
    Figment::new().merge(Toml::file(path)).extract()
}

/// Parses a scenario from an in-memory TOML document.
pub fn parse_scenario(toml: &str) -> Result<ScenarioConfig, figment::Error> {
    Figment::new().merge(Toml::string(toml)).extract()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::structs::ObstacleShape;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;
    use percept_core::nmea::{FixQuality, PositioningMode};

    const SCENARIO: &str = r#"
        [simulation]
        seed = 7
        duration_seconds = 5.0
        physics_rate = 200.0
        utc_epoch = "2024-06-01T12:00:00Z"

        [world]
        gravity = [0.0, 0.0, -9.8]

        [[world.obstacles]]
        name = "wall"
        pose = { translation = [10.0, 0.0, 1.0] }
        shape = { type = "Box", size = [0.5, 20.0, 2.0] }

        [[agents]]
        name = "car"
        starting_pose = { translation = [0.0, 0.0, 1.0], rotation = [0.0, 0.0, 90.0] }
        linear_velocity = [0.0, 2.0, 0.0]

        [[agents.sensors]]
        kind = "Lidar"
        name = "roof_lidar"
        rate = 20.0
        transform = { translation = [0.0, 0.0, 1.2] }
        grid = { layers = 32, samples = 720, angle_min = -15.0, angle_max = 15.0 }

        [[agents.sensors]]
        kind = "Gps"
        name = "gnss"
        gnss = { satellite_count = 10, satellite_ids = [1, 4, 9], positioning_mode = "Autonomous", fix_quality = "Differential" }

        [[agents.sensors]]
        kind = "Imu"
        name = "imu"
        rate = 200.0
        noise = { gaussian_enabled = true, angular_velocity_sigma = [0.01, 0.01, 0.01] }

        [[agents.sensors]]
        kind = "GroundTruth"
        name = "truth"
    "#;

    #[test]
    fn parses_full_scenario() {
        let config = parse_scenario(SCENARIO).unwrap();

        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.physics_rate, 200.0);
        assert!(config.simulation.utc_epoch.is_some());
        assert_abs_diff_eq!(config.world.gravity, Vector3::new(0.0, 0.0, -9.8), epsilon = 1e-12);
        assert_eq!(
            config.world.obstacles[0].shape,
            ObstacleShape::Box { size: [0.5, 20.0, 2.0] }
        );

        let agent = &config.agents[0];
        assert_eq!(agent.name, "car");
        assert_eq!(agent.sensors.len(), 4);
        let forward = agent.starting_pose.to_pose().forward();
        assert_abs_diff_eq!(forward.y, 1.0, epsilon = 1e-9);

        let kinds: Vec<&str> = agent.sensors.iter().map(|s| s.get_kind_str()).collect();
        assert_eq!(kinds, ["Lidar", "Gps", "Imu", "GroundTruth"]);
        let names: Vec<&str> = agent.sensors.iter().map(|s| s.get_name()).collect();
        assert_eq!(names, ["roof_lidar", "gnss", "imu", "truth"]);

        match &agent.sensors[0] {
            SensorConfig::Lidar(lidar) => {
                assert_eq!(lidar.rate, 20.0);
                assert_eq!(lidar.grid.layers, 32);
                assert_eq!(lidar.grid.samples, 720);
                // Unspecified grid fields keep their defaults.
                assert_eq!(lidar.grid.range_max, 100.0);
            }
            other => panic!("expected a lidar, got {other:?}"),
        }
        match &agent.sensors[1] {
            SensorConfig::Gps(gps) => {
                assert_eq!(gps.rate, 10.0);
                assert_eq!(gps.gnss.satellite_count, 10);
                assert_eq!(gps.gnss.satellite_ids, vec![1, 4, 9]);
                assert_eq!(gps.gnss.positioning_mode, PositioningMode::Autonomous);
                assert_eq!(gps.gnss.fix_quality, FixQuality::Differential);
                assert_abs_diff_eq!(gps.gnss.geoid_height, 36.7071);
            }
            other => panic!("expected a gps, got {other:?}"),
        }
        match &agent.sensors[2] {
            SensorConfig::Imu(imu) => {
                assert!(imu.noise.gaussian_enabled);
                assert!(!imu.noise.bias_enabled);
                assert_eq!(imu.noise.angular_velocity_sigma, Vector3::repeat(0.01));
            }
            other => panic!("expected an imu, got {other:?}"),
        }
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = parse_scenario("").unwrap();
        assert!(config.agents.is_empty());
        assert_eq!(config.simulation.physics_rate, 400.0);
        assert_eq!(config.world.ground_size, Some(200.0));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse_scenario(
            r#"
            [[agents]]
            name = "car"
            [[agents.sensors]]
            kind = "Gps"
            name = "gnss"
            noise_stddev = [1.0, 1.0, 1.0]
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn unknown_sensor_kind_is_rejected() {
        let err = parse_scenario(
            r#"
            [[agents]]
            name = "car"
            [[agents.sensors]]
            kind = "Camera"
            name = "cam"
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn bundled_scenario_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets/scenarios/urban_block.toml");
        let config = load_scenario(&path).unwrap();

        assert_eq!(config.world.obstacles.len(), 3);
        let agent = &config.agents[0];
        let kinds: Vec<&str> = agent.sensors.iter().map(|s| s.get_kind_str()).collect();
        assert_eq!(kinds, ["Lidar", "Gps", "Imu", "GroundTruth"]);
        match &agent.sensors[2] {
            SensorConfig::Imu(imu) => {
                imu.noise.validate().unwrap();
                assert_eq!(imu.noise.orientation_sigma.len(), 4);
            }
            other => panic!("expected an imu, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_scenario(Path::new("does/not/exist.toml")).is_err());
    }
}
