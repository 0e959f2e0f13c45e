// percept_sim/src/cli.rs

use bevy::prelude::Resource;
use clap::Parser;
use std::path::PathBuf;

/// Percept: headless simulation of LiDAR, GNSS and IMU sensors.
///
/// The command-line arguments accepted by binaries built on the percept_sim
/// library.
#[derive(Parser, Debug, Resource, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/urban_block.toml")]
    pub scenario: PathBuf,

    /// Overrides the scenario's `duration_seconds`.
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Overrides the scenario's PRNG seed.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_bundled_scenario() {
        let cli = Cli::parse_from(["percept"]);
        assert_eq!(cli.scenario, PathBuf::from("assets/scenarios/urban_block.toml"));
        assert!(cli.duration.is_none());
        assert!(cli.seed.is_none());
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from(["percept", "-s", "my.toml", "--duration", "2.5", "--seed", "9"]);
        assert_eq!(cli.scenario, PathBuf::from("my.toml"));
        assert_eq!(cli.duration, Some(2.5));
        assert_eq!(cli.seed, Some(9));
    }
}
