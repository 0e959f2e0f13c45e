// percept_core/src/models/mod.rs

pub mod kinematics;
pub mod perception;
