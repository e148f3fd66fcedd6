//! PureFlo firmware library.
//!
//! Turbidity-driven pump controller:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                   │
//! │                                                            │
//! │  StepperDriver   LogDisplay    WifiManager   HTTP queue    │
//! │  (MotorPort)     (DisplayPort) (Connectivity)(RequestSrc)  │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ────────────────     │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │  TurbiditySampler · PumpController · NetService  │      │
//! │  │              (around the StateStore)             │      │
//! │  └──────────────────────────────────────────────────┘      │
//! │                                                            │
//! │  workers: motor-drive · sampler · ui · net · link          │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os =
//! "espidf")]` within each module, so the whole crate tests host-side.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod net;
pub mod pins;
pub mod sensors;
pub mod store;
pub mod ui;
pub mod workers;

pub mod adapters;
pub mod drivers;
