//! SHT31 temperature/humidity sensor, one per mux channel.
//!
//! Single-shot high-repeatability measurement without clock stretching:
//! write the command, wait out the conversion, read the 6-byte frame
//! (temp MSB/LSB/CRC, hum MSB/LSB/CRC). Both words are CRC-checked.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: talks to the bus through `hw_init`. On host/test: reads
//! per-node injectable values from static atomics.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::error::SensorError;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// Single-shot, high repeatability, no clock stretching.
#[cfg(target_os = "espidf")]
const CMD_MEASURE: [u8; 2] = [0x24, 0x00];
/// High-repeatability conversion takes up to 15 ms.
#[cfg(target_os = "espidf")]
const MEASURE_DELAY_MS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sht31Reading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub struct Sht31 {
    addr: u8,
    /// Mux channel this node sits behind; doubles as the sim slot index.
    node: usize,
}

impl Sht31 {
    pub fn new(addr: u8, node: usize) -> Self {
        Self { addr, node }
    }

    #[cfg(target_os = "espidf")]
    pub fn read(&self) -> Result<Sht31Reading, SensorError> {
        if !hw_init::i2c_write(self.addr, &CMD_MEASURE) {
            return Err(SensorError::BusNack);
        }
        std::thread::sleep(std::time::Duration::from_millis(MEASURE_DELAY_MS));

        let mut frame = [0u8; 6];
        if !hw_init::i2c_read(self.addr, &mut frame) {
            return Err(SensorError::BusNack);
        }
        decode_frame(&frame)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&self) -> Result<Sht31Reading, SensorError> {
        if !SIM_CONNECTED[self.node].load(Ordering::Relaxed) {
            return Err(SensorError::BusNack);
        }
        Ok(Sht31Reading {
            temperature_c: f32::from_bits(SIM_TEMP_C[self.node].load(Ordering::Relaxed)),
            humidity_pct: f32::from_bits(SIM_HUM_PCT[self.node].load(Ordering::Relaxed)),
        })
    }
}

/// Validate both CRCs and convert per the datasheet formulas.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn decode_frame(frame: &[u8; 6]) -> Result<Sht31Reading, SensorError> {
    if crc8(&frame[0..2]) != frame[2] || crc8(&frame[3..5]) != frame[5] {
        return Err(SensorError::CrcMismatch);
    }
    let raw_t = u16::from_be_bytes([frame[0], frame[1]]);
    let raw_h = u16::from_be_bytes([frame[3], frame[4]]);

    let temperature_c = -45.0 + 175.0 * f32::from(raw_t) / 65535.0;
    let humidity_pct = 100.0 * f32::from(raw_h) / 65535.0;

    // The formulas bound humidity to 0..=100 by construction; temperature
    // outside the sensor's rated range means a misread worth rejecting.
    if !(-40.0..=125.0).contains(&temperature_c) {
        return Err(SensorError::OutOfRange);
    }
    Ok(Sht31Reading {
        temperature_c,
        humidity_pct,
    })
}

/// CRC-8 as specified in the SHT3x datasheet: poly 0x31, init 0xFF.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

// ── Host simulation injection ─────────────────────────────────

#[cfg(not(target_os = "espidf"))]
const SIM_SLOTS: usize = crate::config::NUM_SENSOR_NODES;

// 22 °C / 50 % defaults keep the simulated composter idle.
#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_C: [AtomicU32; SIM_SLOTS] = [
    AtomicU32::new(0x41B0_0000),
    AtomicU32::new(0x41B0_0000),
    AtomicU32::new(0x41B0_0000),
];
#[cfg(not(target_os = "espidf"))]
static SIM_HUM_PCT: [AtomicU32; SIM_SLOTS] = [
    AtomicU32::new(0x4248_0000),
    AtomicU32::new(0x4248_0000),
    AtomicU32::new(0x4248_0000),
];
#[cfg(not(target_os = "espidf"))]
static SIM_CONNECTED: [AtomicBool; SIM_SLOTS] = [
    AtomicBool::new(true),
    AtomicBool::new(true),
    AtomicBool::new(true),
];

/// Inject a simulated reading for `node` and mark it connected.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_node(node: usize, temperature_c: f32, humidity_pct: f32) {
    SIM_TEMP_C[node].store(temperature_c.to_bits(), Ordering::Relaxed);
    SIM_HUM_PCT[node].store(humidity_pct.to_bits(), Ordering::Relaxed);
    SIM_CONNECTED[node].store(true, Ordering::Relaxed);
}

/// Simulate a node failing to acknowledge on the bus.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_disconnected(node: usize) {
    SIM_CONNECTED[node].store(false, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc8_matches_datasheet_example() {
        // SHT3x datasheet: CRC over 0xBEEF is 0x92.
        assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
    }

    #[test]
    fn decode_converts_known_raw_values() {
        // raw_t = 0x6666 -> ~25 C, raw_h = 0x8000 -> ~50 %.
        let t = [0x66, 0x66];
        let h = [0x80, 0x00];
        let frame = [t[0], t[1], crc8(&t), h[0], h[1], crc8(&h)];
        let r = decode_frame(&frame).unwrap();
        assert!((r.temperature_c - 25.0).abs() < 0.1);
        assert!((r.humidity_pct - 50.0).abs() < 0.1);
    }

    #[test]
    fn decode_rejects_bad_crc() {
        let t = [0x66, 0x66];
        let h = [0x80, 0x00];
        let mut frame = [t[0], t[1], crc8(&t), h[0], h[1], crc8(&h)];
        frame[2] ^= 0x01;
        assert_eq!(decode_frame(&frame), Err(SensorError::CrcMismatch));
    }

    #[test]
    fn sim_injection_round_trips() {
        sim_set_node(0, 61.5, 33.0);
        let s = Sht31::new(0x44, 0);
        let r = s.read().unwrap();
        assert_eq!(r.temperature_c, 61.5);
        assert_eq!(r.humidity_pct, 33.0);

        sim_set_disconnected(0);
        assert_eq!(s.read(), Err(SensorError::BusNack));
        sim_set_node(0, 22.0, 50.0);
    }
}
