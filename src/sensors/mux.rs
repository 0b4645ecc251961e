//! TCA9548A I²C multiplexer.
//!
//! The three sensor nodes share one bus through the mux; selecting a
//! channel is a single control-register write of `1 << channel`.

use crate::drivers::hw_init;
use crate::error::SensorError;

pub struct TcaMux {
    addr: u8,
}

impl TcaMux {
    pub fn new(addr: u8) -> Self {
        Self { addr }
    }

    /// Route the bus to `channel` (0..=7).
    #[cfg(target_os = "espidf")]
    pub fn select(&self, channel: u8) -> Result<(), SensorError> {
        if hw_init::i2c_write(self.addr, &[1u8 << channel]) {
            Ok(())
        } else {
            Err(SensorError::MuxSelectFailed)
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn select(&self, _channel: u8) -> Result<(), SensorError> {
        Ok(())
    }

    /// Disconnect all channels. Called after a scan so a hung node cannot
    /// hold the shared bus between ticks.
    pub fn disable_all(&self) {
        let _ = hw_init::i2c_write(self.addr, &[0u8]);
    }
}
