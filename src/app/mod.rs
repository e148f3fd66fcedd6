//! Port traits and outbound events — the boundary between the control
//! core and its collaborators.

pub mod events;
pub mod ports;
