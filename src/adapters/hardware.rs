//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the three SSR drivers, exposing them through
//! [`SensorPort`] and [`ActuatorPort`]. This is the only module in the
//! system that drives actual actuator hardware. On non-espidf targets the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::relay::SsrRelay;
use crate::pins;
use crate::scheduler::OutputLines;
use crate::sensors::{SensorHub, SensorSnapshot};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    pump: SsrRelay,
    blower_1: SsrRelay,
    blower_2: SsrRelay,
}

impl HardwareAdapter {
    pub fn new(sensor_hub: SensorHub) -> Self {
        Self {
            sensor_hub,
            pump: SsrRelay::new(pins::SSR_PUMP_GPIO, "pump"),
            blower_1: SsrRelay::new(pins::SSR_BLOWER_1_GPIO, "blower1"),
            blower_2: SsrRelay::new(pins::SSR_BLOWER_2_GPIO, "blower2"),
        }
    }
}

impl SensorPort for HardwareAdapter {
    fn snapshot(&mut self) -> SensorSnapshot {
        self.sensor_hub.read_all()
    }
}

impl ActuatorPort for HardwareAdapter {
    fn apply(&mut self, lines: OutputLines) {
        self.pump.set(lines.pump);
        self.blower_1.set(lines.blower_1);
        self.blower_2.set(lines.blower_2);
    }
}
