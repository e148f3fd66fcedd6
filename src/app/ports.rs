//! Port traits — the boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ control core
//! ```
//!
//! Driven adapters (motor driver, display, event sinks) implement
//! these traits. The core consumes them via generics, so it never
//! touches hardware directly and every test runs against mocks.

// ───────────────────────────────────────────────────────────────
// Motor port (domain → stepper driver)
// ───────────────────────────────────────────────────────────────

/// The motor-driver collaborator, reduced to exactly the calls the
/// controller and the drive worker need. No internal driver state is
/// shared beyond these.
pub trait MotorPort {
    /// Set the speed ceiling (steps per second).
    fn set_max_speed(&mut self, sps: u16);

    /// Set the target speed (steps per second), clamped to the max.
    fn set_speed(&mut self, sps: u16);

    /// Advance one step if one is due. Returns `true` if a step pulse
    /// was emitted. Called continuously by the motor-drive worker.
    fn run_once(&mut self) -> bool;

    /// Halt stepping immediately.
    fn stop(&mut self);

    /// Enable the driver power stage.
    fn wake(&mut self);

    /// Disable the driver power stage (coils de-energised).
    fn sleep(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log,
/// network, display).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Sink that discards everything. Handy for call sites that have no
/// interest in events (e.g. the boot-time default-state apply).
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &super::events::AppEvent) {}
}
