//! PureFlo firmware entry point (ESP-IDF target).
//!
//! Boot wiring only: bring up logging and peripherals, construct the
//! shared state and adapters, then hand everything to the five worker
//! threads. No control logic lives here.

#![deny(unused_must_use)]

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use log::info;

use pureflo::adapters::display::LogDisplay;
use pureflo::adapters::http;
use pureflo::adapters::log_sink::LogEventSink;
use pureflo::adapters::wifi::{ConnectivityPort, WifiManager};
use pureflo::app::events::AppEvent;
use pureflo::app::ports::{EventSink, MotorPort, NullSink};
use pureflo::config::SystemConfig;
use pureflo::control::pump::{PumpController, PumpState};
use pureflo::drivers::{hw_init, stepper::StepperDriver};
use pureflo::net::NetService;
use pureflo::sensors::TurbiditySampler;
use pureflo::sensors::turbidity::TurbiditySensor;
use pureflo::store::StateStore;
use pureflo::ui::UiWorker;
use pureflo::workers;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("PureFlo v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical. Parking here lets the
        // task watchdog reset the device after its timeout.
        log::error!("HAL init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate()?;
    info!(
        "config: sensing={} threshold={:.2}V sample={}ms",
        config.turbidity_sensing_enabled,
        config.clean_threshold_volts,
        config.sample_interval_ms
    );

    // ── 3. Shared state + adapters ────────────────────────────
    let store = Arc::new(StateStore::new(PumpState::Stopped));
    let link_up = Arc::new(AtomicBool::new(false));

    let motor = Arc::new(Mutex::new(StepperDriver::new()));
    motor
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .set_max_speed(config.motor_max_speed_sps);

    let pump = PumpController::new(
        Arc::clone(&store),
        Arc::clone(&motor),
        config.turbidity_sensing_enabled,
        config.motor_run_speed_sps,
    );

    // Apply the configured boot state through the normal path so the
    // store and the motor agree from the first instant.
    pump.request_pump(config.pump_default_running, &mut NullSink)?;

    let sensor = TurbiditySensor::new(
        pureflo::pins::TURBIDITY_ADC_GPIO,
        config.vref_variant,
        config.adc_reference_volts,
        config.adc_full_scale,
    );
    let sampler = TurbiditySampler::new(sensor, Arc::clone(&store), pump.clone(), &config);

    let wifi = Arc::new(Mutex::new(WifiManager::new()));
    {
        let mut w = wifi.lock().unwrap_or_else(PoisonError::into_inner);
        // Credentials come from the provisioning build step for now.
        if let (Some(ssid), Some(pass)) = (option_env!("PUREFLO_SSID"), option_env!("PUREFLO_PASS"))
        {
            if w.set_credentials(ssid, pass).is_ok() {
                let _ = w.connect();
            }
        }
    }

    let (queue, source) = http::request_channel();
    let _server = http::serve(queue)?;

    let ui = UiWorker::new(
        LogDisplay::new(),
        pump.clone(),
        Arc::clone(&store),
        Arc::clone(&link_up),
    );

    let service = NetService::new(Arc::clone(&store), pump.clone(), Arc::clone(&wifi));

    LogEventSink.emit(&AppEvent::Started);

    // ── 4. Workers ────────────────────────────────────────────
    let sample_interval = Duration::from_millis(config.sample_interval_ms as u64);
    let touch_interval = Duration::from_millis(config.touch_poll_interval_ms as u64);
    let net_interval = Duration::from_millis(config.net_poll_interval_ms as u64);
    let link_interval = Duration::from_millis(config.link_poll_interval_ms as u64);

    let handles = [
        workers::spawn(workers::MOTOR_DRIVE, {
            let motor = Arc::clone(&motor);
            move || workers::run_motor_drive(motor)
        }),
        workers::spawn(workers::SAMPLER, move || {
            workers::run_sampler(sampler, sample_interval, LogEventSink)
        }),
        workers::spawn(workers::UI, move || {
            workers::run_ui(ui, touch_interval, LogEventSink)
        }),
        workers::spawn(workers::NET, move || {
            workers::run_net(service, source, net_interval, LogEventSink)
        }),
        workers::spawn(workers::LINK, {
            let wifi = Arc::clone(&wifi);
            let link_up = Arc::clone(&link_up);
            move || workers::run_link_monitor(wifi, link_up, link_interval, LogEventSink)
        }),
    ];

    info!("System ready. {} workers running.", handles.len());

    for handle in handles {
        let _ = handle.join();
    }
    Ok(())
}
