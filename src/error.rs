//! Unified error types for the composter firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level control loop's error handling uniform.  All variants are `Copy`
//! so they can pass through the control path without allocation.

use core::fmt;

use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor node could not be read or returned implausible data.
    Sensor(SensorError),
    /// The persisted settings record could not be written.
    Store(StoreError),
    /// Peripheral initialisation failed.
    Init(HwInitError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
        }
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Per-node bus failures.  A node that raises any of these is reported as
/// disconnected in the snapshot — the error never reaches the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The multiplexer did not acknowledge the channel-select write.
    MuxSelectFailed,
    /// The sensor did not acknowledge on the bus.
    BusNack,
    /// The measurement frame failed its CRC check.
    CrcMismatch,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MuxSelectFailed => write!(f, "mux channel select failed"),
            Self::BusNack => write!(f, "no bus acknowledge"),
            Self::CrcMismatch => write!(f, "CRC mismatch"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Settings-store errors
// ---------------------------------------------------------------------------

/// Failures of the persisted settings record.
///
/// `load()` never surfaces these — a missing or corrupt record is replaced
/// with defaults and rewritten.  `save()` failures are logged by the caller
/// and the control loop continues on its in-memory state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Filesystem I/O failed.
    Io,
    /// The record on disk had the wrong byte count.
    WrongSize,
    /// The record decoded but failed field validation.
    Invalid(&'static str),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error"),
            Self::WrongSize => write!(f, "record size mismatch"),
            Self::Invalid(msg) => write!(f, "invalid record: {msg}"),
        }
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsystem_errors_funnel_into_the_top_level() {
        let e: Error = SensorError::CrcMismatch.into();
        assert_eq!(e, Error::Sensor(SensorError::CrcMismatch));

        let e: Error = StoreError::WrongSize.into();
        assert_eq!(e, Error::Store(StoreError::WrongSize));

        let e: Error = HwInitError::I2cInitFailed(-1).into();
        assert_eq!(e, Error::Init(HwInitError::I2cInitFailed(-1)));
    }

    #[test]
    fn display_carries_the_subsystem_prefix() {
        assert_eq!(Error::Store(StoreError::Io).to_string(), "store: I/O error");
        assert_eq!(
            Error::Init(HwInitError::GpioConfigFailed(263)).to_string(),
            "init: GPIO config failed (rc=263)"
        );
    }
}
