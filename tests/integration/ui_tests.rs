//! UI worker: touch dispatch and row rendering against the log display.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use pureflo::adapters::display::LogDisplay;
use pureflo::control::pump::{PumpController, PumpState};
use pureflo::store::StateStore;
use pureflo::ui::{BTN_PUMP_OFF, BTN_PUMP_ON, ROW_LINK, ROW_PUMP, UiWorker};

use crate::mock_hw::{MockMotor, RecordingSink};

struct Rig {
    store: Arc<StateStore>,
    link_up: Arc<AtomicBool>,
    ui: UiWorker<MockMotor, LogDisplay>,
}

fn rig() -> Rig {
    let store = Arc::new(StateStore::new(PumpState::Stopped));
    let motor = Arc::new(Mutex::new(MockMotor::new()));
    let pump = PumpController::new(Arc::clone(&store), motor, true, 600);
    let link_up = Arc::new(AtomicBool::new(false));
    let ui = UiWorker::new(
        LogDisplay::new(),
        pump,
        Arc::clone(&store),
        Arc::clone(&link_up),
    );
    Rig { store, link_up, ui }
}

#[test]
fn touch_on_start_button_starts_pump() {
    let mut rig = rig();
    let mut sink = RecordingSink::new();

    let (x, y) = BTN_PUMP_ON.center();
    rig.ui.display_mut().sim_touch(x, y);
    rig.ui.tick(&mut sink);

    assert_eq!(rig.store.pump_state.get(), Some(PumpState::Running));
    assert_eq!(sink.pump_changes(), 1);
}

#[test]
fn touch_on_stop_button_stops_pump() {
    let mut rig = rig();
    let mut sink = RecordingSink::new();
    assert!(rig.store.pump_state.set(PumpState::Running));

    let (x, y) = BTN_PUMP_OFF.center();
    rig.ui.display_mut().sim_touch(x, y);
    rig.ui.tick(&mut sink);

    assert_eq!(rig.store.pump_state.get(), Some(PumpState::Stopped));
}

#[test]
fn touch_outside_buttons_is_ignored() {
    let mut rig = rig();
    let mut sink = RecordingSink::new();

    rig.ui.display_mut().sim_touch(5, 5);
    rig.ui.tick(&mut sink);

    assert_eq!(rig.store.pump_state.get(), Some(PumpState::Stopped));
    assert!(sink.events.is_empty());
}

#[test]
fn pump_row_reflects_state() {
    let mut rig = rig();
    let mut sink = RecordingSink::new();

    rig.ui.tick(&mut sink);
    assert_eq!(rig.ui.display_mut().row(ROW_PUMP), "PUMP: stopped");

    assert!(rig.store.pump_state.set(PumpState::Running));
    rig.ui.tick(&mut sink);
    assert_eq!(rig.ui.display_mut().row(ROW_PUMP), "PUMP: RUNNING");
}

#[test]
fn link_row_tracks_connectivity_flag() {
    let mut rig = rig();
    let mut sink = RecordingSink::new();

    rig.ui.tick(&mut sink);
    assert_eq!(rig.ui.display_mut().row(ROW_LINK), "WIFI: offline");

    rig.link_up.store(true, Ordering::Relaxed);
    rig.ui.tick(&mut sink);
    assert_eq!(rig.ui.display_mut().row(ROW_LINK), "WIFI: connected");
}
