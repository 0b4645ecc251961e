//! Outbound application events.
//!
//! The [`ControlService`](super::service::ControlService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them — log to serial, queue for
//! upload, flash an LED.

use serde::Serialize;

use crate::error::StoreError;
use crate::scheduler::{BlowerPhase, TriggerKind};
use crate::sensors::SensorSnapshot;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// A pump run started; `manual` distinguishes button/screen runs from
    /// the dryness trigger.
    PumpStarted { manual: bool },
    PumpStopped,

    /// A blower sequence started (carries which path fired).
    BlowerStarted(TriggerKind),
    /// The sequence moved between stages or back to idle.
    BlowerPhaseChanged(BlowerPhase),

    /// A settings mutation was applied and is about to be persisted.
    SettingsChanged,
    /// The record was written to storage.
    SettingsSaved,
    /// A storage write failed; the in-memory record stays authoritative.
    SaveFailed(StoreError),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time snapshot suitable for logging or transmission as one
/// JSON line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryData {
    /// Wall-clock seconds; zero while the clock is unsynced.
    pub epoch_s: u32,
    pub sensors: SensorSnapshot,
    pub pump_active: bool,
    pub blower_phase: &'static str,
    pub last_pump_epoch: u32,
    pub last_blower_epoch: u32,
}
