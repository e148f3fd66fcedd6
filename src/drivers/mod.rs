//! Hardware drivers. Each driver is a dumb actuator/peripheral
//! wrapper; policy lives in the control core.

pub mod hw_init;
pub mod stepper;
pub mod task_pin;
