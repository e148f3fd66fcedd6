//! Turbidity sensor driver (analog scattering probe).
//!
//! Reads the sensor's analog output through an ESP32 ADC channel,
//! converts the raw count to a physical voltage against the configured
//! reference, and maps voltage to an NTU turbidity index via a fixed
//! quadratic calibration curve. Clearer water drives the output
//! voltage up, so NTU falls as voltage rises.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH6 via the oneshot API (initialised by
//! hw_init). On host/test: reads an injectable raw value.

use crate::config::VrefVariant;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

// ───────────────────────────────────────────────────────────────
// Calibration
// ───────────────────────────────────────────────────────────────

/// Quadratic NTU calibration: `ntu = a·v² + b·v + c`, clamped at 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl Calibration {
    /// Coefficients for a reference-voltage variant.
    ///
    /// `Native3V3` is the probe's datasheet curve applied to the
    /// measured voltage directly. `Divider5V0` folds the 5.0/3.3
    /// divider gain into the datasheet coefficients so the same
    /// formula applies to the divided-down ADC voltage.
    pub fn for_variant(variant: VrefVariant) -> Self {
        match variant {
            VrefVariant::Native3V3 => Self {
                a: -1120.4,
                b: 5742.3,
                c: -4352.9,
            },
            VrefVariant::Divider5V0 => Self {
                a: -2572.1,
                b: 8700.5,
                c: -4352.9,
            },
        }
    }

    /// Map a voltage to the turbidity index, clamping negatives to 0.
    pub fn ntu(&self, volts: f32) -> f32 {
        (self.a * volts * volts + self.b * volts + self.c).max(0.0)
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor
// ───────────────────────────────────────────────────────────────

/// One raw sample and its derived quantities.
#[derive(Debug, Clone, Copy)]
pub struct RawSample {
    pub raw: u16,
    pub volts: f32,
    pub ntu: f32,
}

pub struct TurbiditySensor {
    cal: Calibration,
    vref: f32,
    full_scale: u16,
    _adc_gpio: i32,
    #[cfg(not(target_os = "espidf"))]
    sim_raw: u16,
}

impl TurbiditySensor {
    pub fn new(adc_gpio: i32, variant: VrefVariant, vref: f32, full_scale: u16) -> Self {
        Self {
            cal: Calibration::for_variant(variant),
            vref,
            full_scale,
            _adc_gpio: adc_gpio,
            #[cfg(not(target_os = "espidf"))]
            sim_raw: 0,
        }
    }

    pub fn calibration(&self) -> Calibration {
        self.cal
    }

    /// Read the ADC once and derive voltage + NTU.
    pub fn sample(&mut self) -> RawSample {
        let raw = self.read_adc();
        let volts = self.raw_to_volts(raw);
        let ntu = self.cal.ntu(volts);
        RawSample { raw, volts, ntu }
    }

    /// Linear scale against the reference voltage, negatives clamped.
    fn raw_to_volts(&self, raw: u16) -> f32 {
        (raw as f32 * self.vref / self.full_scale as f32).max(0.0)
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_TURBIDITY)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        self.sim_raw
    }

    /// Inject the next raw ADC value (host/test builds only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_raw(&mut self, raw: u16) {
        self.sim_raw = raw;
    }
}
