//! Outbound application events.
//!
//! Workers emit these through the [`EventSink`](super::ports::EventSink)
//! port. Adapters on the other side decide what to do with them — log
//! to serial, refresh a display row, push over the network.

use crate::control::pump::PumpState;
use crate::sensors::SampleRecord;

/// Structured events emitted by the control core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The pump transitioned between states (UI indicator refresh).
    PumpStateChanged { from: PumpState, to: PumpState },

    /// A new turbidity aggregate was committed to the store.
    SampleCommitted(SampleRecord),

    /// The derived clean flag changed value.
    CleanChanged(bool),

    /// Network link came up or went down.
    ConnectivityChanged { connected: bool },

    /// The firmware finished boot wiring.
    Started,
}
