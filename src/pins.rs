//! Pin map for the PureFlo ESP32 carrier board.
//!
//! The TFT/touch controller owns its own SPI pins (configured by the
//! display collaborator); only the pins this firmware drives directly
//! are listed here.

/// Turbidity sensor analog output (ADC1_CH6).
pub const TURBIDITY_ADC_GPIO: i32 = 34;

/// Stepper driver STEP pulse pin.
pub const MOTOR_STEP_GPIO: i32 = 25;

/// Stepper driver DIR pin.
pub const MOTOR_DIR_GPIO: i32 = 26;

/// Stepper driver nSLEEP pin (low = power stage disabled).
pub const MOTOR_SLEEP_GPIO: i32 = 27;
