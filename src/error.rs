//! Unified error types for the PureFlo firmware.
//!
//! A single `Error` enum that the control core funnels into, keeping
//! worker-loop error handling uniform. All variants are `Copy` so they
//! can be passed between workers without allocation. Port-specific
//! failures (e.g. `ConnectivityError`) live beside their ports; only
//! what crosses worker boundaries belongs here.
//!
//! Nothing in this taxonomy is fatal at runtime: every error maps to
//! "skip this iteration and retry on the next cadence". `Init` and
//! `Config` abort boot before the workers start.

use core::fmt;

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A guarded store field could not be locked within its bound.
    /// The payload names the field; the caller must treat the
    /// operation as "no update occurred".
    LockTimeout(&'static str),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration violates a cross-field invariant.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockTimeout(field) => write!(f, "lock timeout on '{field}'"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
