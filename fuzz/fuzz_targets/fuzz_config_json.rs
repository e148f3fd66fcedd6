//! Fuzz target: `SystemConfig` JSON deserialisation
//!
//! Drives arbitrary byte sequences through serde_json and asserts that
//! parsing never panics and that any config that parses and validates
//! survives a serialise/parse round trip.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use pureflo::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(config) = serde_json::from_slice::<SystemConfig>(data) else {
        return;
    };

    if config.validate().is_ok() {
        let json = serde_json::to_string(&config).expect("valid config must serialise");
        let back: SystemConfig =
            serde_json::from_str(&json).expect("own output must parse back");
        assert!(back.validate().is_ok(), "round trip must preserve validity");
    }
});
