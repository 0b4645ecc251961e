//! Smart Composter Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single-threaded polled event loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter    LogEventSink      FileSettingsStore      │
//! │  (Sensor+Actuator)  (EventSink)       (SettingsStorePort)    │
//! │  LogPresentation    ClockAdapter                             │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ────────────────        │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │            ControlService (pure logic)             │      │
//! │  │  ActuationScheduler · Settings · History           │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use composter::adapters::hardware::HardwareAdapter;
use composter::adapters::log_sink::{LogEventSink, LogPresentation};
use composter::adapters::settings_file::FileSettingsStore;
use composter::adapters::time::ClockAdapter;
use composter::app::commands::AppCommand;
use composter::app::events::AppEvent;
use composter::app::ports::{EventSink, SettingsStorePort};
use composter::app::service::ControlService;
use composter::config::{CONTROL_LOOP_INTERVAL_MS, TELEMETRY_INTERVAL_SECS};
use composter::drivers::button::ButtonDriver;
use composter::drivers::watchdog::Watchdog;
use composter::drivers::hw_init;
use composter::events::{self, Event, push_event};
use composter::pins;
use composter::sensors::SensorHub;

/// Main loop poll period. Buttons are sampled at this rate; the control
/// tick fires every `CONTROL_LOOP_INTERVAL_MS / POLL_INTERVAL_MS` polls.
const POLL_INTERVAL_MS: u32 = 100;

#[cfg(target_os = "espidf")]
const SETTINGS_PATH: &str = "/spiffs/config.bin";
#[cfg(not(target_os = "espidf"))]
const SETTINGS_PATH: &str = "composter-config.bin";

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    #[cfg(target_os = "espidf")]
    esp_idf_svc::sys::link_patches();
    #[cfg(target_os = "espidf")]
    esp_idf_logger::init()?;

    info!("composter v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical; halt and let the hardware
        // watchdog reset us.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    mount_storage()?;
    let watchdog = Watchdog::new();

    // ── 2. Construct adapters ─────────────────────────────────
    let mut store = FileSettingsStore::new(SETTINGS_PATH);
    let cfg = store.load();
    info!(
        "schedule: interval={}s pump={}s blower={}s",
        cfg.activation_interval_sec, cfg.pump_duration_sec, cfg.blower_duration_sec
    );

    let mut hw = HardwareAdapter::new(SensorHub::new());
    let mut sink = LogEventSink::new();
    let mut present = LogPresentation::new();
    let clock = ClockAdapter::new();

    let mut btn_pump = ButtonDriver::new(pins::BTN_PUMP_GPIO);
    let mut btn_blower = ButtonDriver::new(pins::BTN_BLOWER_GPIO);
    let mut btn_stop = ButtonDriver::new(pins::BTN_STOP_GPIO);

    // ── 3. Construct the control service ──────────────────────
    let mut service = ControlService::new(cfg);

    info!("system ready, entering control loop");

    // ── 4. Event loop ─────────────────────────────────────────
    let polls_per_tick = CONTROL_LOOP_INTERVAL_MS / POLL_INTERVAL_MS;
    let mut poll_count: u32 = 0;
    let mut telemetry_secs: u32 = 0;

    loop {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(
            POLL_INTERVAL_MS,
        )));

        if btn_pump.poll() {
            push_event(Event::ButtonPump);
        }
        if btn_blower.poll() {
            push_event(Event::ButtonBlower);
        }
        if btn_stop.poll() {
            push_event(Event::ButtonStop);
        }

        poll_count += 1;
        if poll_count >= polls_per_tick {
            poll_count = 0;
            if !push_event(Event::ControlTick) {
                log::warn!(
                    "event queue full ({} pending), control tick dropped",
                    events::queue_len()
                );
            }

            telemetry_secs += 1;
            if telemetry_secs >= TELEMETRY_INTERVAL_SECS {
                telemetry_secs = 0;
                push_event(Event::TelemetryTick);
            }
        }

        let now_ms = clock.uptime_ms();
        let now_epoch = clock.epoch_s();

        events::drain_events(|event| match event {
            Event::ControlTick => {
                service.tick(
                    now_ms,
                    now_epoch,
                    &mut hw,
                    &mut store,
                    &mut sink,
                    &mut present,
                );
            }
            Event::TelemetryTick => {
                sink.emit(&AppEvent::Telemetry(service.telemetry(now_epoch)));
            }
            Event::ButtonPump => {
                service.handle_command(
                    AppCommand::ManualPump,
                    now_ms,
                    now_epoch,
                    &mut hw,
                    &mut store,
                    &mut sink,
                );
            }
            Event::ButtonBlower => {
                service.handle_command(
                    AppCommand::ManualBlower,
                    now_ms,
                    now_epoch,
                    &mut hw,
                    &mut store,
                    &mut sink,
                );
            }
            Event::ButtonStop => {
                service.handle_command(
                    AppCommand::StopAll,
                    now_ms,
                    now_epoch,
                    &mut hw,
                    &mut store,
                    &mut sink,
                );
            }
        });

        watchdog.feed();
    }
}

/// Mount the SPIFFS partition that holds the settings record.
#[cfg(target_os = "espidf")]
fn mount_storage() -> Result<()> {
    use esp_idf_svc::sys::*;

    let base_path = c"/spiffs";
    let cfg = esp_vfs_spiffs_conf_t {
        base_path: base_path.as_ptr(),
        partition_label: core::ptr::null(),
        max_files: 4,
        format_if_mount_failed: true,
    };
    // SAFETY: called once at boot before any file access; the config
    // struct outlives the call.
    let ret = unsafe { esp_vfs_spiffs_register(&cfg) };
    if ret != ESP_OK {
        anyhow::bail!("SPIFFS mount failed (rc={})", ret);
    }
    info!("SPIFFS mounted at /spiffs");
    Ok(())
}

/// Host targets write the record to the working directory.
#[cfg(not(target_os = "espidf"))]
fn mount_storage() -> Result<()> {
    Ok(())
}
