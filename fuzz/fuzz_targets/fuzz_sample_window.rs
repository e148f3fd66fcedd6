//! Fuzz target: `SampleWindow` statistics
//!
//! Feeds arbitrary f32 sequences (including NaN, infinities and
//! subnormals) into the rolling window and asserts the derived
//! statistics never panic and every reported average from finite
//! in-range input stays inside the valid band.
//!
//! cargo fuzz run fuzz_sample_window

#![no_main]

use libfuzzer_sys::fuzz_target;
use pureflo::sensors::history::SampleWindow;

const VREF: f32 = 3.3;

fuzz_target!(|data: &[u8]| {
    let mut w: SampleWindow = SampleWindow::new();
    let mut all_finite_in_range = true;

    for chunk in data.chunks_exact(4) {
        let v = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        if !(v.is_finite() && (0.0..=VREF).contains(&v)) {
            all_finite_in_range = false;
        }
        w.push(v);
        // Derivations must never panic, whatever was pushed.
        let _ = w.slope();
        let _ = w.average_in_range(VREF);
    }

    if all_finite_in_range {
        if let Some(avg) = w.average_in_range(VREF) {
            assert!(avg > 0.0, "average from in-range samples must be positive");
            assert!(avg <= VREF + 1e-3, "average must stay within the band");
        }
    }
});
