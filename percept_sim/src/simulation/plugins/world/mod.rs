// percept_sim/src/simulation/plugins/world/mod.rs

pub mod spawner;

pub use spawner::WorldSpawnerPlugin;
