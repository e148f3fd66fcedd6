//! Outbound adapters — implementations of the port traits that talk
//! to the real world (or simulate it host-side).

pub mod display;
pub mod http;
pub mod log_sink;
pub mod wifi;
