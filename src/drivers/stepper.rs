//! Stepper motor driver (A4988/DRV8825-class STEP/DIR interface).
//!
//! Constant-speed pulse generation: the drive worker calls
//! [`StepperDriver::run_once`] in a tight loop and the driver emits a
//! STEP edge whenever the configured interval has elapsed. Speed
//! changes take effect on the next pulse.
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator: whether the pump *should* run is
//! decided by the pump controller. The power stage is held in sleep
//! whenever the pump is commanded off so the coils do not heat.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives STEP/DIR/nSLEEP GPIOs via hw_init helpers.
//! On host/test: tracks state in-memory only.

use std::time::{Duration, Instant};

use crate::app::ports::MotorPort;
use crate::drivers::hw_init;
use crate::pins;

pub struct StepperDriver {
    max_sps: u16,
    target_sps: u16,
    awake: bool,
    step_level: bool,
    last_step: Option<Instant>,
    steps_emitted: u64,
}

impl StepperDriver {
    /// Conservative ceiling until boot wiring applies the configured
    /// one through [`MotorPort::set_max_speed`].
    const DEFAULT_MAX_SPS: u16 = 1000;

    pub fn new() -> Self {
        Self {
            max_sps: Self::DEFAULT_MAX_SPS,
            target_sps: 0,
            awake: false,
            step_level: false,
            last_step: None,
            steps_emitted: 0,
        }
    }

    fn step_interval(&self) -> Option<Duration> {
        if self.target_sps == 0 {
            return None;
        }
        Some(Duration::from_micros(1_000_000 / self.target_sps as u64))
    }

    fn emit_step_edge(&mut self) {
        self.step_level = !self.step_level;
        hw_init::gpio_write(pins::MOTOR_STEP_GPIO, self.step_level);
        self.steps_emitted += 1;
    }

    /// Total STEP edges emitted since boot (diagnostics).
    pub fn steps_emitted(&self) -> u64 {
        self.steps_emitted
    }

    pub fn is_awake(&self) -> bool {
        self.awake
    }

    pub fn target_sps(&self) -> u16 {
        self.target_sps
    }
}

impl Default for StepperDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MotorPort for StepperDriver {
    fn set_max_speed(&mut self, sps: u16) {
        self.max_sps = sps;
        self.target_sps = self.target_sps.min(sps);
    }

    fn set_speed(&mut self, sps: u16) {
        self.target_sps = sps.min(self.max_sps);
    }

    fn run_once(&mut self) -> bool {
        if !self.awake {
            return false;
        }
        let Some(interval) = self.step_interval() else {
            return false;
        };
        let due = match self.last_step {
            None => true,
            Some(t) => t.elapsed() >= interval,
        };
        if !due {
            return false;
        }
        self.last_step = Some(Instant::now());
        self.emit_step_edge();
        true
    }

    fn stop(&mut self) {
        self.target_sps = 0;
        self.last_step = None;
    }

    fn wake(&mut self) {
        if !self.awake {
            hw_init::gpio_write(pins::MOTOR_SLEEP_GPIO, true);
            self.awake = true;
        }
    }

    fn sleep(&mut self) {
        if self.awake {
            hw_init::gpio_write(pins::MOTOR_SLEEP_GPIO, false);
            self.awake = false;
        }
    }
}
