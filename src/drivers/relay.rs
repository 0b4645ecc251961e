//! Solid-state relay output driver.
//!
//! One instance per SSR line (pump, blower stage 1, blower stage 2).
//! Active HIGH; writes go through `hw_init::gpio_write`, which is a no-op
//! on host targets.

use log::debug;

use crate::drivers::hw_init;

pub struct SsrRelay {
    gpio: i32,
    label: &'static str,
    on: bool,
}

impl SsrRelay {
    pub fn new(gpio: i32, label: &'static str) -> Self {
        // Matches the level hw_init drives during output configuration.
        Self {
            gpio,
            label,
            on: false,
        }
    }

    /// Drive the line. Level changes are logged at debug; repeated writes
    /// of the same level are skipped.
    pub fn set(&mut self, on: bool) {
        if on == self.on {
            return;
        }
        hw_init::gpio_write(self.gpio, on);
        self.on = on;
        debug!("ssr {} -> {}", self.label, if on { "ON" } else { "OFF" });
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
