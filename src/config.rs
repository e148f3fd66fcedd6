//! System configuration parameters
//!
//! All tunable parameters for the PureFlo controller. Values are plain
//! data so they can be serialised for the status surface or overridden
//! at build time for bench units.

use serde::{Deserialize, Serialize};

/// Reference-voltage variant of the turbidity sensor front-end.
///
/// Selects the quadratic NTU calibration coefficients. `Native3V3`
/// applies the curve to the measured ADC voltage directly (sensor
/// powered from 3.3 V). `Divider5V0` is for a 5 V sensor read through
/// a 3.3/5 resistor divider; the divider gain is folded into the
/// coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VrefVariant {
    Native3V3,
    Divider5V0,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Turbidity sensing ---
    /// ADC reference voltage (full-scale), volts.
    pub adc_reference_volts: f32,
    /// ADC full-scale raw count (12-bit oneshot = 4095).
    pub adc_full_scale: u16,
    /// Calibration-curve variant for the sensor front-end.
    pub vref_variant: VrefVariant,
    /// Voltage average above which the water is considered clean
    /// (higher voltage = clearer water on this sensor).
    pub clean_threshold_volts: f32,
    /// Master enable for the automatic clean-stop logic.
    pub turbidity_sensing_enabled: bool,

    // --- Pump / motor ---
    /// Stepper speed while the pump runs (steps per second).
    pub motor_run_speed_sps: u16,
    /// Stepper speed ceiling (steps per second).
    pub motor_max_speed_sps: u16,
    /// Pump state at boot.
    pub pump_default_running: bool,

    // --- Worker cadences ---
    /// Sampler tick interval (milliseconds).
    pub sample_interval_ms: u32,
    /// Touch poll interval (milliseconds).
    pub touch_poll_interval_ms: u32,
    /// Network-service idle poll interval (milliseconds).
    pub net_poll_interval_ms: u32,
    /// Connectivity monitor interval (milliseconds).
    pub link_poll_interval_ms: u32,
}

impl SystemConfig {
    /// Check cross-field invariants before the config is applied.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::Error;

        if self.adc_reference_volts <= 0.0 || self.adc_full_scale == 0 {
            return Err(Error::Config("ADC scale must be positive"));
        }
        if self.clean_threshold_volts <= 0.0
            || self.clean_threshold_volts >= self.adc_reference_volts
        {
            return Err(Error::Config("clean threshold outside ADC range"));
        }
        if self.motor_run_speed_sps == 0 || self.motor_run_speed_sps > self.motor_max_speed_sps {
            return Err(Error::Config("motor run speed outside (0, max]"));
        }
        if self.sample_interval_ms == 0
            || self.touch_poll_interval_ms == 0
            || self.net_poll_interval_ms == 0
            || self.link_poll_interval_ms == 0
        {
            return Err(Error::Config("worker intervals must be non-zero"));
        }
        Ok(())
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Turbidity sensing
            adc_reference_volts: 3.3,
            adc_full_scale: 4095,
            vref_variant: VrefVariant::Native3V3,
            clean_threshold_volts: 2.5,
            turbidity_sensing_enabled: true,

            // Pump / motor
            motor_run_speed_sps: 600,
            motor_max_speed_sps: 1000,
            pump_default_running: false,

            // Cadences
            sample_interval_ms: 1000,   // 1 Hz
            touch_poll_interval_ms: 40, // 25 Hz
            net_poll_interval_ms: 10,
            link_poll_interval_ms: 1000,
        }
    }
}
