//! Task Watchdog Timer supervision of the control loop.
//!
//! The composter runs a single polled loop that must call [`Watchdog::feed`]
//! every iteration. The timeout spans ten control ticks, so a slow sensor
//! scan or a burst of button events never trips it; only a wedged loop
//! forces the panic handler and a reboot into the all-off power-on state.

use crate::config::CONTROL_LOOP_INTERVAL_MS;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// TWDT timeout. The slowest legitimate iteration is a full three-node
/// sensor scan plus a settings write, well under one control tick.
pub const WATCHDOG_TIMEOUT_MS: u32 = 10 * CONTROL_LOOP_INTERVAL_MS;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the control-loop task.
    pub fn new() -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from main() before the loop starts; the
            // IDF copies the config struct.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms: WATCHDOG_TIMEOUT_MS,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                if esp_task_wdt_reconfigure(&cfg) != ESP_OK {
                    // The IDF bootstrap may have configured the TWDT
                    // already; the add below still subscribes this task.
                    log::warn!("watchdog: reconfigure rejected, keeping existing timeout");
                }

                let subscribed = esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK;
                if subscribed {
                    log::info!(
                        "watchdog: control loop subscribed ({} ms timeout)",
                        WATCHDOG_TIMEOUT_MS
                    );
                } else {
                    log::warn!("watchdog: subscribe failed, loop runs unsupervised");
                }
                Self { subscribed }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::debug!("watchdog: host build, supervision disabled");
            Self {}
        }
    }

    /// Feed the watchdog. Called once per loop iteration.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: reset only touches the calling task's TWDT slot.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}
