//! Pump controller behaviour against a recorded mock motor.

use std::sync::{Arc, Mutex};

use pureflo::control::pump::{PumpController, PumpState};
use pureflo::store::StateStore;

use crate::mock_hw::{MockMotor, MotorCall, RecordingSink};

fn rig() -> (
    Arc<StateStore>,
    Arc<Mutex<MockMotor>>,
    PumpController<MockMotor>,
) {
    let store = Arc::new(StateStore::new(PumpState::Stopped));
    let motor = Arc::new(Mutex::new(MockMotor::new()));
    let pump = PumpController::new(Arc::clone(&store), Arc::clone(&motor), true, 600);
    (store, motor, pump)
}

#[test]
fn idempotent_request_touches_nothing() {
    let (store, motor, pump) = rig();
    let mut sink = RecordingSink::new();

    pump.request_pump(false, &mut sink).unwrap();

    assert!(motor.lock().unwrap().calls.is_empty());
    assert!(sink.events.is_empty());
    assert_eq!(store.pump_state.get(), Some(PumpState::Stopped));
}

#[test]
fn manual_start_wakes_and_drives_motor() {
    let (store, motor, pump) = rig();
    let mut sink = RecordingSink::new();

    pump.request_pump(true, &mut sink).unwrap();

    assert_eq!(store.pump_state.get(), Some(PumpState::Running));
    assert_eq!(
        motor.lock().unwrap().calls,
        vec![MotorCall::Wake, MotorCall::SetSpeed(600)]
    );
    assert_eq!(sink.pump_changes(), 1);
}

#[test]
fn manual_stop_halts_and_sleeps_motor() {
    let (store, motor, pump) = rig();
    let mut sink = RecordingSink::new();

    pump.request_pump(true, &mut sink).unwrap();
    pump.request_pump(false, &mut sink).unwrap();

    assert_eq!(store.pump_state.get(), Some(PumpState::Stopped));
    let calls = motor.lock().unwrap().calls.clone();
    assert_eq!(
        calls[2..],
        [MotorCall::Stop, MotorCall::SetSpeed(0), MotorCall::Sleep]
    );
}

#[test]
fn start_while_clean_records_override() {
    let (store, _motor, pump) = rig();
    let mut sink = RecordingSink::new();
    assert!(store.clean_flag.set(true));

    pump.request_pump(true, &mut sink).unwrap();

    assert_eq!(store.manual_override.get(), Some(true));
}

#[test]
fn start_while_dirty_records_no_override() {
    let (store, _motor, pump) = rig();
    let mut sink = RecordingSink::new();

    pump.request_pump(true, &mut sink).unwrap();

    assert_eq!(store.manual_override.get(), Some(false));
}

#[test]
fn stop_cancels_active_override() {
    let (store, _motor, pump) = rig();
    let mut sink = RecordingSink::new();
    assert!(store.clean_flag.set(true));

    pump.request_pump(true, &mut sink).unwrap();
    assert_eq!(store.manual_override.get(), Some(true));

    pump.request_pump(false, &mut sink).unwrap();
    assert_eq!(store.manual_override.get(), Some(false));
}

#[test]
fn stop_while_dirty_resets_stale_override() {
    let (store, _motor, pump) = rig();
    let mut sink = RecordingSink::new();

    assert!(store.pump_state.set(PumpState::Running));
    assert!(store.manual_override.set(true));
    // Water measures dirty; the stale override must not survive a stop.
    pump.request_pump(false, &mut sink).unwrap();

    assert_eq!(store.manual_override.get(), Some(false));
}

#[test]
fn sensing_disabled_controller_never_touches_override() {
    let store = Arc::new(StateStore::new(PumpState::Stopped));
    let motor = Arc::new(Mutex::new(MockMotor::new()));
    let pump = PumpController::new(Arc::clone(&store), motor, false, 600);
    let mut sink = RecordingSink::new();
    assert!(store.clean_flag.set(true));

    pump.request_pump(true, &mut sink).unwrap();
    assert_eq!(store.manual_override.get(), Some(false));

    assert!(store.manual_override.set(true));
    pump.request_pump(false, &mut sink).unwrap();
    assert_eq!(store.manual_override.get(), Some(true));
}
