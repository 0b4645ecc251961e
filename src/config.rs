//! Persisted schedule configuration.
//!
//! [`ScheduleConfig`] is the single record that survives reboot: per-node
//! sensor thresholds, actuator run durations, the scheduled-activation
//! interval, the settings-screen PIN, and the two trigger timestamps the
//! rearm logic depends on.  It is stored as a fixed-size binary record
//! (see [`RECORD_SIZE`]) so a truncated or stale file is detectable by
//! byte count alone.
//!
//! All mutation funnels through the control service; screens read the
//! values but never write them directly.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Number of temperature/humidity sensor nodes on the multiplexer.
pub const NUM_SENSOR_NODES: usize = 3;

/// Control loop period.  The scheduler is polled at roughly this rate;
/// all of its timing maths takes explicit timestamps, so drift here only
/// affects reaction latency, never correctness.
pub const CONTROL_LOOP_INTERVAL_MS: u32 = 1000;

/// Telemetry snapshot period.
pub const TELEMETRY_INTERVAL_SECS: u32 = 60;

/// Exact byte count of the encoded record.  A persisted blob of any other
/// length is treated as corrupt and replaced with defaults.
pub const RECORD_SIZE: usize = 58;

/// User-editable values that survive a reboot, plus the two actuation
/// timestamps the scheduler persists when a trigger fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Per-node low temperature thresholds (°F).  Displayed on the
    /// settings screens; not consulted by the scheduler.
    pub temp_low_f: [f32; NUM_SENSOR_NODES],
    /// Per-node high temperature thresholds (°F) — the over-temperature
    /// blower override fires when any connected node reaches its value.
    pub temp_high_f: [f32; NUM_SENSOR_NODES],
    /// Per-node low humidity thresholds (%) — the pump dryness trigger
    /// fires when any connected node drops below its value.
    pub hum_low_pct: [f32; NUM_SENSOR_NODES],

    /// Settings-screen PIN, four ASCII digits.
    pub user_pin: [u8; 4],
    /// Whether the settings screens require the PIN.
    pub pin_protection_enabled: bool,

    /// Run length of each blower stage, seconds.
    pub blower_duration_sec: u16,
    /// Run length of a pump activation, seconds.
    pub pump_duration_sec: u16,
    /// Rearm interval for the scheduled blower trigger, seconds.
    pub activation_interval_sec: u32,

    /// Wall-clock seconds of the last pump trigger.  Monotonically
    /// non-decreasing; written only when a trigger fires.
    pub last_pump_epoch: u32,
    /// Wall-clock seconds of the last blower trigger (shared by the
    /// scheduled and over-temperature paths).
    pub last_blower_epoch: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            temp_low_f: [130.0; NUM_SENSOR_NODES],
            temp_high_f: [160.0; NUM_SENSOR_NODES],
            hum_low_pct: [40.0; NUM_SENSOR_NODES],
            user_pin: *b"0000",
            pin_protection_enabled: true,
            blower_duration_sec: 10,
            pump_duration_sec: 10,
            activation_interval_sec: 3600,
            // Zero epochs let the very first synced tick arm both triggers.
            last_pump_epoch: 0,
            last_blower_epoch: 0,
        }
    }
}

impl ScheduleConfig {
    /// Encode into the fixed-layout little-endian record.
    ///
    /// Layout: 3×f32 temp_low, 3×f32 temp_high, 3×f32 hum_low, 4-byte PIN
    /// plus NUL terminator, protection flag, u16 blower duration, u16 pump
    /// duration, u32 activation interval, u32 last pump epoch, u32 last
    /// blower epoch.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        let mut at = 0;

        let mut put = |bytes: &[u8], at: &mut usize| {
            buf[*at..*at + bytes.len()].copy_from_slice(bytes);
            *at += bytes.len();
        };

        for v in self
            .temp_low_f
            .iter()
            .chain(&self.temp_high_f)
            .chain(&self.hum_low_pct)
        {
            put(&v.to_le_bytes(), &mut at);
        }
        put(&self.user_pin, &mut at);
        put(&[0u8], &mut at); // NUL terminator, fixed
        put(&[u8::from(self.pin_protection_enabled)], &mut at);
        put(&self.blower_duration_sec.to_le_bytes(), &mut at);
        put(&self.pump_duration_sec.to_le_bytes(), &mut at);
        put(&self.activation_interval_sec.to_le_bytes(), &mut at);
        put(&self.last_pump_epoch.to_le_bytes(), &mut at);
        put(&self.last_blower_epoch.to_le_bytes(), &mut at);

        debug_assert_eq!(at, RECORD_SIZE);
        buf
    }

    /// Decode a persisted record.  Any byte count other than
    /// [`RECORD_SIZE`] is rejected outright.
    pub fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() != RECORD_SIZE {
            return Err(StoreError::WrongSize);
        }

        let mut at = 0;
        let mut f32_at = |at: &mut usize| {
            let v = f32::from_le_bytes(bytes[*at..*at + 4].try_into().unwrap_or([0; 4]));
            *at += 4;
            v
        };

        let mut temp_low_f = [0.0; NUM_SENSOR_NODES];
        let mut temp_high_f = [0.0; NUM_SENSOR_NODES];
        let mut hum_low_pct = [0.0; NUM_SENSOR_NODES];
        for v in &mut temp_low_f {
            *v = f32_at(&mut at);
        }
        for v in &mut temp_high_f {
            *v = f32_at(&mut at);
        }
        for v in &mut hum_low_pct {
            *v = f32_at(&mut at);
        }

        let user_pin: [u8; 4] = bytes[at..at + 4].try_into().unwrap_or(*b"0000");
        at += 5; // PIN + NUL terminator
        let pin_protection_enabled = bytes[at] != 0;
        at += 1;

        let mut u16_at = |at: &mut usize| {
            let v = u16::from_le_bytes(bytes[*at..*at + 2].try_into().unwrap_or([0; 2]));
            *at += 2;
            v
        };
        let blower_duration_sec = u16_at(&mut at);
        let pump_duration_sec = u16_at(&mut at);

        let mut u32_at = |at: &mut usize| {
            let v = u32::from_le_bytes(bytes[*at..*at + 4].try_into().unwrap_or([0; 4]));
            *at += 4;
            v
        };
        let activation_interval_sec = u32_at(&mut at);
        let last_pump_epoch = u32_at(&mut at);
        let last_blower_epoch = u32_at(&mut at);

        Ok(Self {
            temp_low_f,
            temp_high_f,
            hum_low_pct,
            user_pin,
            pin_protection_enabled,
            blower_duration_sec,
            pump_duration_sec,
            activation_interval_sec,
            last_pump_epoch,
            last_blower_epoch,
        })
    }

    /// Range-check every field.  A record that fails validation is treated
    /// the same as a corrupt one: replaced with defaults and rewritten.
    pub fn validate(&self) -> Result<(), StoreError> {
        for i in 0..NUM_SENSOR_NODES {
            if !(0.0..=250.0).contains(&self.temp_low_f[i]) {
                return Err(StoreError::Invalid("temp_low_f must be 0–250 °F"));
            }
            if !(0.0..=250.0).contains(&self.temp_high_f[i]) {
                return Err(StoreError::Invalid("temp_high_f must be 0–250 °F"));
            }
            if self.temp_low_f[i] >= self.temp_high_f[i] {
                return Err(StoreError::Invalid("temp_low_f must be < temp_high_f"));
            }
            if !(0.0..=100.0).contains(&self.hum_low_pct[i]) {
                return Err(StoreError::Invalid("hum_low_pct must be 0–100 %"));
            }
        }
        if !self.user_pin.iter().all(u8::is_ascii_digit) {
            return Err(StoreError::Invalid("user_pin must be four ASCII digits"));
        }
        if self.blower_duration_sec == 0 {
            return Err(StoreError::Invalid("blower_duration_sec must be non-zero"));
        }
        if self.pump_duration_sec == 0 {
            return Err(StoreError::Invalid("pump_duration_sec must be non-zero"));
        }
        if self.activation_interval_sec == 0 {
            return Err(StoreError::Invalid(
                "activation_interval_sec must be non-zero",
            ));
        }
        Ok(())
    }

    /// PIN as a displayable string slice, or "????" if the stored bytes
    /// are somehow not UTF-8 (validation rejects that on every write path).
    pub fn pin_str(&self) -> &str {
        core::str::from_utf8(&self.user_pin).unwrap_or("????")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = ScheduleConfig::default();
        assert!(c.validate().is_ok());
        for i in 0..NUM_SENSOR_NODES {
            assert!(c.temp_low_f[i] < c.temp_high_f[i]);
        }
        assert!(c.blower_duration_sec > 0);
        assert!(c.pump_duration_sec > 0);
        assert!(c.activation_interval_sec > 0);
        assert_eq!(c.last_pump_epoch, 0);
        assert_eq!(c.last_blower_epoch, 0);
    }

    #[test]
    fn record_round_trip() {
        let mut c = ScheduleConfig::default();
        c.hum_low_pct[1] = 35.5;
        c.temp_high_f[2] = 155.0;
        c.user_pin = *b"0742";
        c.activation_interval_sec = 7200;
        c.last_pump_epoch = 1_750_000_000;
        c.last_blower_epoch = 1_750_000_600;

        let bytes = c.encode();
        assert_eq!(bytes.len(), RECORD_SIZE);
        let back = ScheduleConfig::decode(&bytes).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn decode_rejects_wrong_size() {
        let bytes = ScheduleConfig::default().encode();
        assert_eq!(
            ScheduleConfig::decode(&bytes[..RECORD_SIZE - 1]),
            Err(StoreError::WrongSize)
        );
        let mut longer = bytes.to_vec();
        longer.push(0);
        assert_eq!(
            ScheduleConfig::decode(&longer),
            Err(StoreError::WrongSize)
        );
        assert_eq!(ScheduleConfig::decode(&[]), Err(StoreError::WrongSize));
    }

    #[test]
    fn pin_terminator_is_fixed_nul() {
        let mut c = ScheduleConfig::default();
        c.user_pin = *b"9999";
        let bytes = c.encode();
        // PIN sits right after the 9 threshold floats.
        assert_eq!(&bytes[36..40], b"9999");
        assert_eq!(bytes[40], 0);
    }

    #[test]
    fn validate_rejects_inverted_thresholds() {
        let mut c = ScheduleConfig::default();
        c.temp_low_f[0] = 170.0; // above temp_high_f[0] = 160
        assert!(matches!(c.validate(), Err(StoreError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_non_digit_pin() {
        let mut c = ScheduleConfig::default();
        c.user_pin = *b"12a4";
        assert!(matches!(c.validate(), Err(StoreError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_zero_durations() {
        let mut c = ScheduleConfig::default();
        c.pump_duration_sec = 0;
        assert!(c.validate().is_err());

        let mut c = ScheduleConfig::default();
        c.activation_interval_sec = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn serde_json_round_trip() {
        let c = ScheduleConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: ScheduleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }
}
