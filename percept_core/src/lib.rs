// percept_core/src/lib.rs

// Framework-agnostic sensor models. Nothing in here knows about a game
// engine; the simulation adapter feeds poses and scene queries in and
// publishes what comes out.
pub mod error;
pub mod geodesy;
pub mod messages;
pub mod models;
pub mod nmea;
pub mod noise;
pub mod prelude;
pub mod sensors;
pub mod types;
