//! One-shot hardware peripheral initialization.
//!
//! Configures the turbidity ADC channel and the stepper GPIOs using
//! raw ESP-IDF sys calls. Called once from `main()` before the
//! workers are spawned.

#[cfg(target_os = "espidf")]
use esp_idf_sys::*;

#[cfg(target_os = "espidf")]
use crate::pins;
use crate::error::Result;

/// ADC1 channel for the turbidity probe (GPIO34 on classic ESP32).
pub const ADC1_CH_TURBIDITY: u32 = 6;

// ── Init ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<()> {
    // SAFETY: called once from main() before any worker is spawned.
    unsafe {
        init_adc()?;
        init_gpio_outputs()?;
    }
    log::info!("hw_init: peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<()> {
    log::info!("hw_init(host): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<()> {
    use crate::error::Error;

    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is written exactly once, here, at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        log::error!("hw_init: adc_oneshot_new_unit rc={}", ret);
        return Err(Error::Init("ADC1 oneshot unit"));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe {
        adc_oneshot_config_channel(ADC1_HANDLE, ADC1_CH_TURBIDITY as adc_channel_t, &chan_cfg)
    };
    if ret != ESP_OK as i32 {
        log::error!("hw_init: adc_oneshot_config_channel rc={}", ret);
        return Err(Error::Init("ADC1 channel config"));
    }
    Ok(())
}

/// Read one raw sample from an ADC1 channel. Returns 0 on a failed
/// conversion (excluded from averaging as a placeholder downstream).
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: core::ffi::c_int = 0;
    // SAFETY: handle initialised at boot; oneshot reads are reentrant
    // per the IDF docs as long as the handle outlives the call.
    let ret = unsafe { adc_oneshot_read(ADC1_HANDLE, channel as adc_channel_t, &mut raw) };
    if ret != ESP_OK as i32 {
        log::warn!("adc1_read: conversion failed (rc={})", ret);
        return 0;
    }
    raw as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

// ── GPIO outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<()> {
    use crate::error::Error;

    for gpio in [
        pins::MOTOR_STEP_GPIO,
        pins::MOTOR_DIR_GPIO,
        pins::MOTOR_SLEEP_GPIO,
    ] {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << gpio,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            log::error!("hw_init: gpio_config({}) rc={}", gpio, ret);
            return Err(Error::Init("motor GPIO config"));
        }
    }
    // Power stage starts inhibited.
    unsafe {
        gpio_set_level(pins::MOTOR_SLEEP_GPIO, 0);
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(gpio: i32, high: bool) {
    // SAFETY: pin configured as output in init_gpio_outputs().
    unsafe {
        gpio_set_level(gpio, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_gpio: i32, _high: bool) {}
