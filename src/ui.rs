//! Touch UI: hit-testing and the render loop body.
//!
//! ```text
//!   touch panel ──▶ poll_touch ──▶ hit_test ──▶ PumpController
//!   StateStore  ──▶ tick       ──▶ draw_row ──▶ TFT rows
//! ```
//!
//! The UI worker owns a [`DisplayPort`] and polls it at 20-50 Hz. All
//! geometry logic is pure and tested; the port is the only hardware
//! seam.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;

use crate::app::ports::{EventSink, MotorPort};
use crate::control::pump::PumpController;
use crate::store::StateStore;

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Row-oriented display plus resistive touch, reduced to the two
/// calls the UI worker needs.
pub trait DisplayPort {
    /// Replace the text of one display row.
    fn draw_row(&mut self, row: u8, text: &str);

    /// Return the most recent touch point, if any, in screen
    /// coordinates. Non-blocking.
    fn poll_touch(&mut self) -> Option<(u16, u16)>;
}

// ───────────────────────────────────────────────────────────────
// Geometry
// ───────────────────────────────────────────────────────────────

pub const SCREEN_W: u16 = 240;
pub const SCREEN_H: u16 = 320;

/// Axis-aligned touch target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonRegion {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl ButtonRegion {
    pub const fn contains(&self, px: u16, py: u16) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    pub const fn center(&self) -> (u16, u16) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }
}

/// Bottom strip, split in halves: left starts the pump, right stops it.
pub const BTN_PUMP_ON: ButtonRegion = ButtonRegion { x: 0, y: 260, w: 120, h: 60 };
pub const BTN_PUMP_OFF: ButtonRegion = ButtonRegion { x: 120, y: 260, w: 120, h: 60 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpAction {
    TurnOn,
    TurnOff,
}

/// Map a touch point to a pump action, if it lands on a button.
pub fn hit_test(x: u16, y: u16) -> Option<PumpAction> {
    if BTN_PUMP_ON.contains(x, y) {
        Some(PumpAction::TurnOn)
    } else if BTN_PUMP_OFF.contains(x, y) {
        Some(PumpAction::TurnOff)
    } else {
        None
    }
}

// ───────────────────────────────────────────────────────────────
// Row layout
// ───────────────────────────────────────────────────────────────

pub const ROW_PUMP: u8 = 0;
pub const ROW_SUMMARY_BASE: u8 = 1;
pub const ROW_LINK: u8 = 6;

// ───────────────────────────────────────────────────────────────
// UI worker body
// ───────────────────────────────────────────────────────────────

/// Per-iteration state of the UI loop. Caches the last rendered text
/// per concern so unchanged rows are not redrawn.
pub struct UiWorker<M: MotorPort, D: DisplayPort> {
    display: D,
    pump: PumpController<M>,
    store: Arc<StateStore>,
    link_up: Arc<AtomicBool>,
    last_pump_row: String,
    last_summary: String,
    last_link_row: String,
}

impl<M: MotorPort, D: DisplayPort> UiWorker<M, D> {
    pub fn new(
        display: D,
        pump: PumpController<M>,
        store: Arc<StateStore>,
        link_up: Arc<AtomicBool>,
    ) -> Self {
        Self {
            display,
            pump,
            store,
            link_up,
            last_pump_row: String::new(),
            last_summary: String::new(),
            last_link_row: String::new(),
        }
    }

    /// Direct access to the display adapter (tests and diagnostics).
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// One UI iteration: service at most one touch, then refresh any
    /// rows whose backing state changed.
    pub fn tick(&mut self, sink: &mut impl EventSink) {
        if let Some((x, y)) = self.display.poll_touch() {
            match hit_test(x, y) {
                Some(PumpAction::TurnOn) => {
                    if let Err(e) = self.pump.request_pump(true, sink) {
                        warn!("ui: pump start rejected: {}", e);
                    }
                }
                Some(PumpAction::TurnOff) => {
                    if let Err(e) = self.pump.request_pump(false, sink) {
                        warn!("ui: pump stop rejected: {}", e);
                    }
                }
                None => {}
            }
        }
        self.render();
    }

    fn render(&mut self) {
        let pump_row = match self.store.pump_state.get() {
            Some(s) if s.is_running() => "PUMP: RUNNING".to_string(),
            Some(_) => "PUMP: stopped".to_string(),
            None => self.last_pump_row.clone(), // store busy, keep last frame
        };
        if pump_row != self.last_pump_row {
            self.display.draw_row(ROW_PUMP, &pump_row);
            self.last_pump_row = pump_row;
        }

        if let Some(data) = self.store.turbidity_data.get() {
            if data.text_summary != self.last_summary {
                for (i, line) in data.text_summary.lines().enumerate() {
                    self.display.draw_row(ROW_SUMMARY_BASE + i as u8, line);
                }
                self.last_summary = data.text_summary;
            }
        }

        let link_row = if self.link_up.load(Ordering::Relaxed) {
            "WIFI: connected"
        } else {
            "WIFI: offline"
        };
        if link_row != self.last_link_row {
            self.display.draw_row(ROW_LINK, link_row);
            self.last_link_row = link_row.to_string();
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
