//! Sampler tick behaviour: averaging, change detection, the clean
//! signal, and the override rule working end to end.

use std::sync::{Arc, Mutex};

use pureflo::config::SystemConfig;
use pureflo::control::pump::{PumpController, PumpState};
use pureflo::pins;
use pureflo::sensors::TurbiditySampler;
use pureflo::sensors::turbidity::TurbiditySensor;
use pureflo::store::StateStore;

use crate::mock_hw::{MockMotor, RecordingSink};

// Raw counts against the 3.3 V / 4095 scale.
const RAW_MIDSCALE: u16 = 2048; // 1.651 V, below clean threshold
const RAW_CLEAN: u16 = 4000; // 3.224 V, above clean threshold
const RAW_DIRTY: u16 = 100; // 0.081 V

fn rig() -> (
    Arc<StateStore>,
    Arc<Mutex<MockMotor>>,
    TurbiditySampler<MockMotor>,
) {
    let config = SystemConfig::default();
    let store = Arc::new(StateStore::new(PumpState::Stopped));
    let motor = Arc::new(Mutex::new(MockMotor::new()));
    let pump = PumpController::new(
        Arc::clone(&store),
        Arc::clone(&motor),
        config.turbidity_sensing_enabled,
        config.motor_run_speed_sps,
    );
    let sensor = TurbiditySensor::new(
        pins::TURBIDITY_ADC_GPIO,
        config.vref_variant,
        config.adc_reference_volts,
        config.adc_full_scale,
    );
    let sampler = TurbiditySampler::new(sensor, Arc::clone(&store), pump, &config);
    (store, motor, sampler)
}

#[test]
fn identical_samples_commit_exactly_once() {
    let (store, _motor, mut sampler) = rig();
    let mut sink = RecordingSink::new();

    sampler.sim_set_raw(RAW_MIDSCALE);
    for _ in 0..5 {
        sampler.tick(&mut sink);
    }

    // The average settles on the first tick and never moves again.
    assert_eq!(sink.commits(), 1);

    let data = store.turbidity_data.get().unwrap();
    assert!((data.voltage.current.average - 1.651).abs() < 0.001);
    assert!(!data.voltage.is_rising);
    assert!(!data.voltage.is_falling);
    assert!(data.json_record.contains("\"voltage\""));
}

#[test]
fn clean_water_stops_unoverridden_pump() {
    let (store, motor, mut sampler) = rig();
    let mut sink = RecordingSink::new();

    // Start the pump while the water is dirty: no override recorded.
    let config = SystemConfig::default();
    let pump = PumpController::new(
        Arc::clone(&store),
        Arc::clone(&motor),
        true,
        config.motor_run_speed_sps,
    );
    pump.request_pump(true, &mut sink).unwrap();
    assert_eq!(store.pump_state.get(), Some(PumpState::Running));
    assert_eq!(store.manual_override.get(), Some(false));

    sampler.sim_set_raw(RAW_CLEAN);
    sampler.tick(&mut sink);

    assert_eq!(store.clean_flag.get(), Some(true));
    assert_eq!(store.pump_state.get(), Some(PumpState::Stopped));
    assert!(!motor.lock().unwrap().is_driving());
}

#[test]
fn override_survives_clean_ticks() {
    let (store, motor, mut sampler) = rig();
    let mut sink = RecordingSink::new();

    // Establish the clean signal first.
    sampler.sim_set_raw(RAW_CLEAN);
    sampler.tick(&mut sink);
    assert_eq!(store.clean_flag.get(), Some(true));

    // Operator insists: starting against clean water sets the override.
    let pump = PumpController::new(Arc::clone(&store), Arc::clone(&motor), true, 600);
    pump.request_pump(true, &mut sink).unwrap();
    assert_eq!(store.manual_override.get(), Some(true));

    // Subsequent clean ticks must not shut the pump off.
    sampler.tick(&mut sink);
    sampler.tick(&mut sink);
    assert_eq!(store.pump_state.get(), Some(PumpState::Running));
}

#[test]
fn override_clears_when_water_turns_dirty() {
    let (store, motor, mut sampler) = rig();
    let mut sink = RecordingSink::new();

    sampler.sim_set_raw(RAW_CLEAN);
    sampler.tick(&mut sink);

    let pump = PumpController::new(Arc::clone(&store), Arc::clone(&motor), true, 600);
    pump.request_pump(true, &mut sink).unwrap();
    assert_eq!(store.manual_override.get(), Some(true));

    // One dirty sample drags the window average below threshold.
    sampler.sim_set_raw(RAW_DIRTY);
    sampler.tick(&mut sink);

    assert_eq!(store.clean_flag.get(), Some(false));
    assert_eq!(store.manual_override.get(), Some(false));
    // Dirty water: the pump keeps running.
    assert_eq!(store.pump_state.get(), Some(PumpState::Running));
}

#[test]
fn rising_voltage_sets_rising_flag() {
    let (_store, _motor, mut sampler) = rig();
    let mut sink = RecordingSink::new();

    for raw in [1000, 1500, 2000, 2500, 3000] {
        sampler.sim_set_raw(raw);
        sampler.tick(&mut sink);
    }

    assert!(sampler.data().voltage.is_rising);
    assert!(!sampler.data().voltage.is_falling);
}

#[test]
fn ntu_average_tracks_voltage_average_through_curve() {
    let (store, _motor, mut sampler) = rig();
    let mut sink = RecordingSink::new();

    sampler.sim_set_raw(RAW_MIDSCALE);
    sampler.tick(&mut sink);

    let data = store.turbidity_data.get().unwrap();
    let v = data.voltage.current.average;
    let expected = -1120.4 * v * v + 5742.3 * v - 4352.9;
    assert!((data.ntu.current.average - expected.max(0.0)).abs() < 0.5);
}

#[test]
fn zero_reads_never_commit() {
    let (store, _motor, mut sampler) = rig();
    let mut sink = RecordingSink::new();

    // ADC returning 0 (failed conversion placeholder) yields no valid
    // average, so the committed aggregate stays at its boot state.
    sampler.sim_set_raw(0);
    for _ in 0..3 {
        sampler.tick(&mut sink);
    }

    assert_eq!(sink.commits(), 0);
    let data = store.turbidity_data.get().unwrap();
    assert!(data.json_record.is_empty());
}
