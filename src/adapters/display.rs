//! Display adapter.
//!
//! On hardware the rows map onto a 240x320 TFT with a resistive touch
//! overlay; host-side this adapter logs row updates and serves touches
//! injected by tests.

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

use log::info;

use crate::ui::DisplayPort;

pub struct LogDisplay {
    rows: [String; 8],
    #[cfg(not(target_os = "espidf"))]
    sim_touches: VecDeque<(u16, u16)>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self {
            rows: Default::default(),
            #[cfg(not(target_os = "espidf"))]
            sim_touches: VecDeque::new(),
        }
    }

    /// Current text of one row (diagnostics and tests).
    pub fn row(&self, row: u8) -> &str {
        &self.rows[row as usize]
    }

    /// Queue a touch point to be returned by the next `poll_touch`.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_touch(&mut self, x: u16, y: u16) {
        self.sim_touches.push_back((x, y));
    }
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for LogDisplay {
    fn draw_row(&mut self, row: u8, text: &str) {
        let idx = row as usize;
        if idx >= self.rows.len() {
            return;
        }
        if self.rows[idx] != text {
            info!("display row {}: {}", row, text);
            self.rows[idx] = text.to_string();
        }
        // TFT text draw goes through the SPI panel driver on hardware;
        // the row cache above is the source of truth either way.
    }

    #[cfg(target_os = "espidf")]
    fn poll_touch(&mut self) -> Option<(u16, u16)> {
        // XPT2046 touch read over SPI, threaded in from main.rs once
        // the panel driver owns the bus.
        None
    }

    #[cfg(not(target_os = "espidf"))]
    fn poll_touch(&mut self) -> Option<(u16, u16)> {
        self.sim_touches.pop_front()
    }
}
