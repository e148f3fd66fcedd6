//! Pump/motor control state machine.
//!
//! Two states, two condition inputs:
//!
//! ```text
//!            request(Running)
//!   ┌─────────┐ ──────────────▶ ┌─────────┐
//!   │ Stopped │                 │ Running │
//!   └─────────┘ ◀────────────── └─────────┘
//!            request(Stopped)
//!
//!   conditions: clean (from sampler), override (operator intent)
//! ```
//!
//! The transition logic is a pure function ([`decide`]) so the
//! override rule is testable without any hardware. The controller
//! wraps it with the store writes and motor commands, in that order:
//! the authoritative `pump_state` write must land before any motor
//! command is issued. A store timeout aborts the transition with no
//! motor side effects.

use log::{info, warn};
use std::sync::{Arc, Mutex, PoisonError};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, MotorPort};
use crate::error::{Error, Result};
use crate::store::StateStore;

// ───────────────────────────────────────────────────────────────
// State and decision function
// ───────────────────────────────────────────────────────────────

/// Pump state. Created at boot, mutated only through
/// [`PumpController::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Stopped,
    Running,
}

impl PumpState {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl From<bool> for PumpState {
    fn from(on: bool) -> Self {
        if on { Self::Running } else { Self::Stopped }
    }
}

/// Effects of an accepted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: PumpState,
    pub set_override: bool,
    pub clear_override: bool,
}

/// Pure transition decision.
///
/// `None` means the request is idempotent (already in the requested
/// state): no writes, no motor commands, override untouched.
///
/// Starting the pump while the water already measures clean records
/// operator intent as an override, so the sampler's automatic shutoff
/// does not immediately undo the command. Stopping cancels an active
/// override; stopping while dirty also resets any stale override.
pub fn decide(
    current: PumpState,
    requested: PumpState,
    clean: bool,
    override_active: bool,
    sensing_enabled: bool,
) -> Option<Transition> {
    if requested == current {
        return None;
    }
    match requested {
        PumpState::Running => Some(Transition {
            next: PumpState::Running,
            set_override: sensing_enabled && !override_active && clean,
            clear_override: false,
        }),
        PumpState::Stopped => Some(Transition {
            next: PumpState::Stopped,
            set_override: false,
            clear_override: sensing_enabled && (override_active || !clean),
        }),
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

/// Single entry point for pump transitions, shared by the sampler,
/// UI-input and network-service workers. Cheap to clone: both the
/// store and the motor handle are shared.
pub struct PumpController<M: MotorPort> {
    store: Arc<StateStore>,
    motor: Arc<Mutex<M>>,
    sensing_enabled: bool,
    run_speed_sps: u16,
}

impl<M: MotorPort> Clone for PumpController<M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            motor: Arc::clone(&self.motor),
            sensing_enabled: self.sensing_enabled,
            run_speed_sps: self.run_speed_sps,
        }
    }
}

impl<M: MotorPort> PumpController<M> {
    pub fn new(
        store: Arc<StateStore>,
        motor: Arc<Mutex<M>>,
        sensing_enabled: bool,
        run_speed_sps: u16,
    ) -> Self {
        Self {
            store,
            motor,
            sensing_enabled,
            run_speed_sps,
        }
    }

    /// Boolean convenience wrapper used by the UI and network workers.
    pub fn request_pump(&self, on: bool, sink: &mut impl EventSink) -> Result<()> {
        self.request(PumpState::from(on), sink)
    }

    /// Request a transition to `target`.
    ///
    /// Idempotent when `target` equals the current state. The
    /// authoritative store write happens first; if it cannot land
    /// within its bound the transition aborts before any motor
    /// command.
    pub fn request(&self, target: PumpState, sink: &mut impl EventSink) -> Result<()> {
        let current = self
            .store
            .pump_state
            .get()
            .ok_or(Error::LockTimeout("pump_state"))?;

        let clean = self
            .store
            .clean_flag
            .get()
            .ok_or(Error::LockTimeout("clean_flag"))?;
        let override_active = self
            .store
            .manual_override
            .get()
            .ok_or(Error::LockTimeout("manual_override"))?;

        let Some(transition) = decide(current, target, clean, override_active, self.sensing_enabled)
        else {
            return Ok(());
        };

        // Durable state first — the motor must never be commanded
        // without the store reflecting it.
        if !self.store.pump_state.set(transition.next) {
            return Err(Error::LockTimeout("pump_state"));
        }

        if transition.set_override && !self.store.manual_override.set(true) {
            warn!("pump: override set lost to store timeout");
        }
        if transition.clear_override && !self.store.manual_override.set(false) {
            warn!("pump: override clear lost to store timeout");
        }

        self.command_motor(transition.next);

        info!("pump: {:?} -> {:?}", current, transition.next);
        sink.emit(&AppEvent::PumpStateChanged {
            from: current,
            to: transition.next,
        });
        Ok(())
    }

    fn command_motor(&self, next: PumpState) {
        let mut motor = self
            .motor
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match next {
            PumpState::Running => {
                motor.wake();
                motor.set_speed(self.run_speed_sps);
            }
            PumpState::Stopped => {
                motor.stop();
                motor.set_speed(0);
                motor.sleep();
            }
        }
    }
}
