//! Turbidity sampling subsystem.
//!
//! [`TurbiditySampler`] runs once per sampling tick: read the probe,
//! update both histories, derive averages/trend/cleanliness, apply the
//! override rule, and commit a fresh [`TurbidityData`] snapshot to the
//! store when (and only when) the voltage average actually moved.

pub mod history;
pub mod turbidity;

use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, MotorPort};
use crate::config::SystemConfig;
use crate::control::pump::{PumpController, PumpState};
use crate::store::StateStore;
use self::history::History;
use self::turbidity::TurbiditySensor;

// ───────────────────────────────────────────────────────────────
// TurbidityData
// ───────────────────────────────────────────────────────────────

/// Compact committed record for the status endpoint and event log.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SampleRecord {
    pub turbidity: f32,
    pub voltage: f32,
    pub turbidity_avg: f32,
    pub voltage_avg: f32,
}

/// Aggregate of both histories plus the serialized summaries for the
/// most recent commit. Mutated exclusively by the sampler; UI and
/// network workers only ever see committed clones out of the store.
#[derive(Debug, Clone, Default)]
pub struct TurbidityData {
    pub voltage: History,
    pub ntu: History,
    /// Human-readable rows for the TFT, valid for the last commit.
    pub text_summary: String,
    /// Machine-readable record for the status endpoint, ditto.
    pub json_record: String,
}

impl TurbidityData {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed compact record (rounded to display resolution).
    pub fn record(&self) -> SampleRecord {
        SampleRecord {
            turbidity: round2(self.ntu.current.value),
            voltage: round2(self.voltage.current.value),
            turbidity_avg: round2(self.ntu.current.average),
            voltage_avg: round2(self.voltage.current.average),
        }
    }

    fn render_summaries(&mut self) {
        let r = self.record();
        self.text_summary = format!(
            "Turbidity: {:.2} NTU\nVoltage:   {:.2}   V\nAverage:   {:.2} NTU / {:.2} V",
            r.turbidity, r.voltage, r.turbidity_avg, r.voltage_avg,
        );
        self.json_record = serde_json::to_string(&r).unwrap_or_default();
    }
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

// ───────────────────────────────────────────────────────────────
// TurbiditySampler
// ───────────────────────────────────────────────────────────────

/// Owns the probe and the working [`TurbidityData`]; the store only
/// ever holds committed clones.
pub struct TurbiditySampler<M: MotorPort> {
    sensor: TurbiditySensor,
    data: TurbidityData,
    store: Arc<StateStore>,
    pump: PumpController<M>,
    vref: f32,
    clean_threshold: f32,
    /// Clean flag from the previous tick, for edge detection.
    last_clean: bool,
}

impl<M: MotorPort> TurbiditySampler<M> {
    pub fn new(
        sensor: TurbiditySensor,
        store: Arc<StateStore>,
        pump: PumpController<M>,
        config: &SystemConfig,
    ) -> Self {
        Self {
            sensor,
            data: TurbidityData::new(),
            store,
            pump,
            vref: config.adc_reference_volts,
            clean_threshold: config.clean_threshold_volts,
            last_clean: false,
        }
    }

    /// One sampling tick. Idempotent when the voltage average has not
    /// moved: no store commit, no summary rebuild.
    pub fn tick(&mut self, sink: &mut impl EventSink) {
        // 1-2. Read, scale, calibrate (clamps applied in the driver).
        let sample = self.sensor.sample();

        // 3. Record both quantities at the shared window position.
        self.data.voltage.record(sample.volts);
        self.data.ntu.record(sample.ntu);

        // 4. Averages. The NTU average is derived by pushing the
        //    voltage average through the calibration curve, keeping
        //    the two reported averages numerically consistent.
        let avg_volts = self
            .data
            .voltage
            .window
            .average_in_range(self.vref)
            .unwrap_or(0.0);
        let avg_ntu = self.sensor.calibration().ntu(avg_volts);
        self.data.voltage.set_average(avg_volts);
        self.data.ntu.set_average(avg_ntu);

        // 5. Trend fit (retains prior flags below 2 samples).
        self.data.voltage.update_trend();
        self.data.ntu.update_trend();

        // 6. Cleanliness: above threshold and not still falling. The
        //    "not falling" term avoids declaring clean mid-transient.
        let clean = avg_volts > self.clean_threshold && !self.data.voltage.is_falling;

        // 7. New data only when the committed voltage average moved.
        let new_data = avg_volts != self.data.voltage.previous.average;

        // 8. Override rule + automatic shutoff. These store writes
        //    must land before the turbidity_data commit below so a
        //    reader never sees a commit inconsistent with them.
        self.apply_clean_transition(clean, sink);

        if new_data {
            self.data.voltage.commit();
            self.data.ntu.commit();
            self.data.render_summaries();
            if self.store.turbidity_data.set(self.data.clone()) {
                sink.emit(&AppEvent::SampleCommitted(self.data.record()));
            } else {
                warn!("sampler: turbidity commit skipped (store busy)");
            }
        } else {
            debug!("sampler: no new data, tick left uncommitted");
        }
    }

    fn apply_clean_transition(&mut self, clean: bool, sink: &mut impl EventSink) {
        // An override is only meaningful while the water measures
        // clean: clear it on the falling edge. If the write fails the
        // edge is left pending and retried next tick.
        if self.last_clean && !clean {
            if !self.store.manual_override.set(false) {
                warn!("sampler: override clear deferred (store busy)");
                return;
            }
        }

        if !self.store.clean_flag.set(clean) {
            warn!("sampler: clean_flag write skipped (store busy)");
        }

        if clean {
            match self.store.manual_override.get() {
                Some(false) => {
                    if let Err(e) = self.pump.request(PumpState::Stopped, sink) {
                        warn!("sampler: auto shutoff failed: {e}");
                    }
                }
                Some(true) => {} // operator override, leave pump alone
                None => warn!("sampler: override unreadable, auto shutoff skipped"),
            }
        }

        if clean != self.last_clean {
            sink.emit(&AppEvent::CleanChanged(clean));
        }
        self.last_clean = clean;
    }

    /// Working copy of the aggregate (primarily for tests).
    pub fn data(&self) -> &TurbidityData {
        &self.data
    }

    /// Inject the next raw ADC value (host/test builds only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_raw(&mut self, raw: u16) {
        self.sensor.sim_set_raw(raw);
    }
}
