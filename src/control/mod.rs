//! Actuator control logic.

pub mod pump;
