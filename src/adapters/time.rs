//! ESP32 time adapter.
//!
//! Two clocks feed the scheduler:
//!
//! - **Uptime** (`uptime_ms`) — monotonic milliseconds since boot, for run
//!   duration measurement. Truncated to `u32`; all consumers compare with
//!   wrapping arithmetic, so the ~49.7 day wrap is harmless.
//! - **Epoch** (`epoch_s`) — wall-clock seconds, for the persisted trigger
//!   timestamps. `None` until the RTC is synced; readings before
//!   2020-01-01 are rejected as an unset clock.
//!
//! On host targets uptime comes from `std::time::Instant` and the epoch
//! from `SystemTime`.

/// Reject wall-clock readings before 2020-01-01 as unsynced.
const EPOCH_2020: i64 = 1_577_836_800;

pub struct ClockAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for ClockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic, wraps at `u32::MAX`).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u32 {
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1000) as u32
    }

    /// Milliseconds since boot (monotonic, wraps at `u32::MAX`).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    /// Wall-clock seconds, or `None` while the clock is unsynced.
    #[cfg(target_os = "espidf")]
    pub fn epoch_s(&self) -> Option<u32> {
        use core::ptr;
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
            return None;
        }
        let secs = i64::from(tv.tv_sec);
        if secs < EPOCH_2020 {
            return None;
        }
        u32::try_from(secs).ok()
    }

    /// Wall-clock seconds from the host system clock.
    #[cfg(not(target_os = "espidf"))]
    pub fn epoch_s(&self) -> Option<u32> {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?
            .as_secs();
        if (secs as i64) < EPOCH_2020 {
            return None;
        }
        u32::try_from(secs).ok()
    }
}
