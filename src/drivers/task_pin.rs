//! Core-pinned thread spawning for the ESP32 dual-core.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread::spawn` creates
//! a FreeRTOS task pinned to a specific CPU core with explicit
//! priority and stack size. On non-ESP targets, falls back to a plain
//! thread spawn so every worker loop also runs host-side.
//!
//! ESP-IDF implements `std::thread` via pthreads over FreeRTOS tasks.
//! `esp_pthread_set_cfg()` sets thread-local configuration applying to
//! the *next* `pthread_create()` from the calling thread, so the
//! config→spawn pair must not interleave with other thread creation.

/// CPU core identifiers for the ESP32 Xtensa LX6 dual-core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU) — WiFi/lwIP stack, UI and network workers.
    Pro = 0,
    /// Core 1 (APP_CPU) — sampling and time-critical motor drive.
    App = 1,
}

/// Spawn a thread pinned to `core` with explicit priority and stack.
///
/// `name` must be null-terminated (e.g. `"motor-drive\0"`).
#[cfg(target_os = "espidf")]
pub fn spawn_on_core(
    core: Core,
    priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> std::thread::JoinHandle<()> {
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = core as i32;
        cfg.prio = priority as i32;
        cfg.stack_size = (stack_kb * 1024) as i32;
        cfg.thread_name = name.as_ptr() as *const _;
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        assert!(
            ret == esp_idf_sys::ESP_OK as i32,
            "esp_pthread_set_cfg failed: {ret}"
        );
    }

    let display_name = name.trim_end_matches('\0');
    log::info!(
        "spawning '{}' on {:?} (pri={}, stack={}KB)",
        display_name,
        core,
        priority,
        stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .spawn(f)
        .expect("spawn_on_core: thread creation failed")
}

/// Host fallback — core affinity and priority are ignored.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core(
    _core: Core,
    _priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> std::thread::JoinHandle<()> {
    let display_name = name.trim_end_matches('\0');
    log::info!("spawning '{}' (host, stack={}KB)", display_name, stack_kb);

    std::thread::Builder::new()
        .name(display_name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
        .expect("spawn_on_core(host): thread creation failed")
}
