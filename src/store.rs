//! Shared state store — every cross-worker mutable field lives here.
//!
//! ```text
//!  sampler ──┐                       ┌── ui-input
//!            ▼                       ▼
//!        ┌──────────────────────────────────┐
//!        │ StateStore                        │
//!        │  pump_state      Guarded<_>       │
//!        │  manual_override Guarded<bool>    │
//!        │  clean_flag      Guarded<bool>    │
//!        │  turbidity_data  Guarded<_>       │
//!        └──────────────────────────────────┘
//!            ▲                       ▲
//!  motor ────┘                       └── net-service
//! ```
//!
//! Each field has its own [`Guarded`] wrapper so unrelated fields are
//! never serialised against each other. Accessors are bounded-wait:
//! a `get` that cannot lock within [`READ_LOCK_TIMEOUT`] returns
//! `None`, a `set` that cannot lock within [`WRITE_LOCK_TIMEOUT`]
//! returns `false`. Callers must treat either as "no update occurred"
//! and retry on their next cadence — no accessor ever blocks
//! indefinitely or panics.

use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

use log::warn;

use crate::control::pump::PumpState;
use crate::sensors::TurbidityData;

/// Bound for read accessors. Reads copy one field and leave.
pub const READ_LOCK_TIMEOUT: Duration = Duration::from_millis(2);

/// Bound for write accessors. Writers may be competing with a reader
/// snapshot, so the bound is wider.
pub const WRITE_LOCK_TIMEOUT: Duration = Duration::from_millis(75);

/// Retry spacing inside the bounded-wait loop.
const LOCK_RETRY_SPACING: Duration = Duration::from_micros(200);

// ───────────────────────────────────────────────────────────────
// Guarded field
// ───────────────────────────────────────────────────────────────

/// One named shared field behind a mutex with bounded-wait accessors.
///
/// Readers get a point-in-time clone, never a live reference, so no
/// lock is ever held across caller code.
pub struct Guarded<T> {
    name: &'static str,
    inner: Mutex<T>,
}

impl<T: Clone> Guarded<T> {
    pub fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            inner: Mutex::new(value),
        }
    }

    /// Copy the field out. `None` means the lock could not be taken
    /// within the read bound; the caller keeps whatever it had.
    pub fn get(&self) -> Option<T> {
        match self.lock_within(READ_LOCK_TIMEOUT) {
            Some(guard) => Some(guard.clone()),
            None => {
                warn!("store: read of '{}' timed out", self.name);
                None
            }
        }
    }

    /// Replace the field. `false` means the write did not happen.
    pub fn set(&self, value: T) -> bool {
        match self.lock_within(WRITE_LOCK_TIMEOUT) {
            Some(mut guard) => {
                *guard = value;
                true
            }
            None => {
                warn!("store: write of '{}' timed out", self.name);
                false
            }
        }
    }

    /// Take the raw lock, bypassing the bounded wait. Lets tests hold
    /// a field hostage to exercise the timeout paths.
    #[cfg(test)]
    pub(crate) fn hold(&self) -> MutexGuard<'_, T> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Try-lock loop with a deadline. A poisoned mutex is recovered
    /// rather than propagated: the stored value is plain data and the
    /// panicking writer cannot have left it torn.
    fn lock_within(&self, bound: Duration) -> Option<MutexGuard<'_, T>> {
        let deadline = Instant::now() + bound;
        loop {
            match self.inner.try_lock() {
                Ok(guard) => return Some(guard),
                Err(TryLockError::Poisoned(poisoned)) => return Some(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return None;
                    }
                    std::thread::sleep(LOCK_RETRY_SPACING);
                }
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// StateStore
// ───────────────────────────────────────────────────────────────

/// Exclusive owner of all cross-worker mutable state.
///
/// Shared between workers as `Arc<StateStore>`. No field is readable
/// or writable except through its guarded accessors.
pub struct StateStore {
    /// Authoritative pump state. Written only by the pump controller.
    pub pump_state: Guarded<PumpState>,
    /// Operator intent to keep the pump running despite clean water.
    pub manual_override: Guarded<bool>,
    /// Derived "water is clean" signal, recomputed each sampler tick.
    pub clean_flag: Guarded<bool>,
    /// Latest committed turbidity aggregate (histories + summaries).
    pub turbidity_data: Guarded<TurbidityData>,
}

impl StateStore {
    /// Build the store with boot defaults. Buffers start empty; the
    /// pump starts in the configured default state.
    pub fn new(initial_pump: PumpState) -> Self {
        Self {
            pump_state: Guarded::new("pump_state", initial_pump),
            manual_override: Guarded::new("manual_override", false),
            clean_flag: Guarded::new("clean_flag", false),
            turbidity_data: Guarded::new("turbidity_data", TurbidityData::new()),
        }
    }
}
