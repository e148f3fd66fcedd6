//! Worker threads.
//!
//! Five loops, each pinned and prioritised so the motor drive always
//! preempts housekeeping:
//!
//! | worker      | core | pri | role                                  |
//! |-------------|------|-----|---------------------------------------|
//! | motor-drive | App  | 22  | continuous STEP pulse generation      |
//! | sampler     | App  | 5   | 1 Hz turbidity tick                   |
//! | ui          | Pro  | 5   | touch poll + row refresh (20-50 Hz)   |
//! | net         | Pro  | 4   | one queued request per iteration      |
//! | link        | Pro  | 3   | WiFi reconnect / restart handling     |
//!
//! WiFi and lwIP service tasks live on the PRO core, so everything
//! that talks to the network stays there; the APP core is reserved
//! for sampling and pulse timing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{info, warn};

use crate::adapters::wifi::ConnectivityPort;
use crate::app::ports::{EventSink, MotorPort};
use crate::app::events::AppEvent;
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::net::{NetService, RequestSource};
use crate::sensors::TurbiditySampler;
use crate::ui::{DisplayPort, UiWorker};

// ───────────────────────────────────────────────────────────────
// Specs
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct WorkerSpec {
    pub name: &'static str,
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
}

pub const MOTOR_DRIVE: WorkerSpec = WorkerSpec {
    name: "motor-drive\0",
    core: Core::App,
    priority: 22,
    stack_kb: 8,
};

pub const SAMPLER: WorkerSpec = WorkerSpec {
    name: "sampler\0",
    core: Core::App,
    priority: 5,
    stack_kb: 16,
};

pub const UI: WorkerSpec = WorkerSpec {
    name: "ui\0",
    core: Core::Pro,
    priority: 5,
    stack_kb: 16,
};

pub const NET: WorkerSpec = WorkerSpec {
    name: "net\0",
    core: Core::Pro,
    priority: 4,
    stack_kb: 16,
};

pub const LINK: WorkerSpec = WorkerSpec {
    name: "link\0",
    core: Core::Pro,
    priority: 3,
    stack_kb: 12,
};

pub fn spawn(spec: WorkerSpec, f: impl FnOnce() + Send + 'static) -> std::thread::JoinHandle<()> {
    spawn_on_core(spec.core, spec.priority, spec.stack_kb, spec.name, f)
}

// ───────────────────────────────────────────────────────────────
// Loop bodies
// ───────────────────────────────────────────────────────────────

/// Idle spacing for the drive loop when no pulse is due. Short enough
/// that the next STEP edge lands within 2% of its slot at 1000 sps.
const DRIVE_IDLE_SPACING: Duration = Duration::from_micros(200);

/// Continuous pulse generation. The motor mutex is held only for the
/// duration of one `run_once` so controller commands interleave.
pub fn run_motor_drive<M: MotorPort>(motor: Arc<Mutex<M>>) {
    info!("motor-drive: running");
    loop {
        let stepped = motor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .run_once();
        if !stepped {
            std::thread::sleep(DRIVE_IDLE_SPACING);
        }
    }
}

/// Fixed-rate turbidity sampling.
pub fn run_sampler<M: MotorPort>(
    mut sampler: TurbiditySampler<M>,
    interval: Duration,
    mut sink: impl EventSink,
) {
    info!("sampler: running every {:?}", interval);
    loop {
        sampler.tick(&mut sink);
        std::thread::sleep(interval);
    }
}

/// Touch polling and row refresh.
pub fn run_ui<M: MotorPort, D: DisplayPort>(
    mut ui: UiWorker<M, D>,
    interval: Duration,
    mut sink: impl EventSink,
) {
    info!("ui: polling every {:?}", interval);
    loop {
        ui.tick(&mut sink);
        std::thread::sleep(interval);
    }
}

/// One queued network request per iteration.
pub fn run_net<M: MotorPort, W: ConnectivityPort>(
    mut service: NetService<M, W>,
    mut source: impl RequestSource,
    interval: Duration,
    mut sink: impl EventSink,
) {
    info!("net: draining queue every {:?}", interval);
    loop {
        service.handle_one(&mut source, &mut sink);
        std::thread::sleep(interval);
    }
}

/// Link supervision: drives the reconnect state machine, publishes
/// up/down edges, and executes a requested restart.
pub fn run_link_monitor<W: ConnectivityPort>(
    wifi: Arc<Mutex<W>>,
    link_up: Arc<AtomicBool>,
    interval: Duration,
    mut sink: impl EventSink,
) {
    info!("link: polling every {:?}", interval);
    let mut last_connected = false;
    loop {
        let (connected, restart) = {
            let mut w = wifi.lock().unwrap_or_else(PoisonError::into_inner);
            w.poll();
            (w.is_connected(), w.restart_requested())
        };

        if connected != last_connected {
            link_up.store(connected, Ordering::Relaxed);
            sink.emit(&AppEvent::ConnectivityChanged { connected });
            last_connected = connected;
        }

        if restart {
            restart_device();
            return;
        }

        std::thread::sleep(interval);
    }
}

#[cfg(target_os = "espidf")]
fn restart_device() {
    warn!("link: restarting device");
    unsafe { esp_idf_sys::esp_restart() }
}

#[cfg(not(target_os = "espidf"))]
fn restart_device() {
    warn!("link(host): restart requested, stopping link monitor");
}
