//! Network service dispatch against a scripted request queue.

use std::sync::{Arc, Mutex};

use pureflo::adapters::wifi::{ConnectivityPort, WifiManager};
use pureflo::config::SystemConfig;
use pureflo::control::pump::{PumpController, PumpState};
use pureflo::net::{NetRequest, NetResponse, NetService};
use pureflo::pins;
use pureflo::sensors::TurbiditySampler;
use pureflo::sensors::turbidity::TurbiditySensor;
use pureflo::store::StateStore;

use crate::mock_hw::{MockMotor, QueueSource, RecordingSink};

struct Rig {
    store: Arc<StateStore>,
    wifi: Arc<Mutex<WifiManager>>,
    service: NetService<MockMotor, WifiManager>,
    sampler: TurbiditySampler<MockMotor>,
}

fn rig() -> Rig {
    let config = SystemConfig::default();
    let store = Arc::new(StateStore::new(PumpState::Stopped));
    let motor = Arc::new(Mutex::new(MockMotor::new()));
    let pump = PumpController::new(
        Arc::clone(&store),
        motor,
        true,
        config.motor_run_speed_sps,
    );
    let sensor = TurbiditySensor::new(
        pins::TURBIDITY_ADC_GPIO,
        config.vref_variant,
        config.adc_reference_volts,
        config.adc_full_scale,
    );
    let sampler = TurbiditySampler::new(sensor, Arc::clone(&store), pump.clone(), &config);
    let wifi = Arc::new(Mutex::new(WifiManager::new()));
    let service = NetService::new(Arc::clone(&store), pump, Arc::clone(&wifi));
    Rig {
        store,
        wifi,
        service,
        sampler,
    }
}

#[test]
fn status_before_first_commit_is_unavailable() {
    let mut rig = rig();
    let mut source = QueueSource::with(&[NetRequest::Status]);
    let mut sink = RecordingSink::new();

    assert!(rig.service.handle_one(&mut source, &mut sink));
    assert_eq!(source.responses, vec![NetResponse::Unavailable]);
}

#[test]
fn status_serves_committed_json() {
    let mut rig = rig();
    let mut sink = RecordingSink::new();

    rig.sampler.sim_set_raw(2048);
    rig.sampler.tick(&mut sink);

    let mut source = QueueSource::with(&[NetRequest::Status]);
    assert!(rig.service.handle_one(&mut source, &mut sink));

    match &source.responses[0] {
        NetResponse::Json(body) => {
            assert!(body.contains("\"turbidity\""));
            assert!(body.contains("\"voltage\""));
        }
        other => panic!("expected JSON, got {:?}", other),
    }
}

#[test]
fn pump_commands_drive_state() {
    let mut rig = rig();
    let mut sink = RecordingSink::new();
    let mut source = QueueSource::with(&[NetRequest::PumpOn, NetRequest::PumpOff]);

    assert!(rig.service.handle_one(&mut source, &mut sink));
    assert_eq!(rig.store.pump_state.get(), Some(PumpState::Running));

    assert!(rig.service.handle_one(&mut source, &mut sink));
    assert_eq!(rig.store.pump_state.get(), Some(PumpState::Stopped));

    assert_eq!(
        source.responses,
        vec![
            NetResponse::Ok("pump running"),
            NetResponse::Ok("pump stopped"),
        ]
    );
}

#[test]
fn one_request_per_iteration() {
    let mut rig = rig();
    let mut sink = RecordingSink::new();
    let mut source = QueueSource::with(&[NetRequest::PumpOn, NetRequest::PumpOff]);

    assert!(rig.service.handle_one(&mut source, &mut sink));
    // Only the first request may have been consumed.
    assert_eq!(source.requests.len(), 1);
    assert_eq!(source.responses.len(), 1);
}

#[test]
fn empty_queue_handles_nothing() {
    let mut rig = rig();
    let mut sink = RecordingSink::new();
    let mut source = QueueSource::default();

    assert!(!rig.service.handle_one(&mut source, &mut sink));
    assert!(source.responses.is_empty());
}

#[test]
fn wifi_reset_clears_credentials_and_requests_restart() {
    let mut rig = rig();
    let mut sink = RecordingSink::new();
    {
        let mut w = rig.wifi.lock().unwrap();
        w.set_credentials("HomeNet", "password1").unwrap();
        w.connect().unwrap();
    }

    let mut source = QueueSource::with(&[NetRequest::ResetCredentials]);
    assert!(rig.service.handle_one(&mut source, &mut sink));

    let w = rig.wifi.lock().unwrap();
    assert!(!w.is_connected());
    assert!(w.restart_requested());
    assert_eq!(
        source.responses,
        vec![NetResponse::Ok("credentials cleared; restarting")]
    );
}
