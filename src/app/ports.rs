//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (sensor hub, relays, settings file, log sink) implement
//! these traits. The [`ControlService`](super::service::ControlService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::config::ScheduleConfig;
use crate::error::StoreError;
use crate::scheduler::{BlowerPhase, OutputLines};
use crate::sensors::SensorSnapshot;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per tick to obtain a
/// consistent snapshot. Bus errors surface as disconnected nodes, never
/// as a port error.
pub trait SensorPort {
    fn snapshot(&mut self) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain commands the three SSR lines through this.
pub trait ActuatorPort {
    /// Drive all three lines to the given levels in one call.
    fn apply(&mut self, lines: OutputLines);

    /// Kill every actuator — safe shutdown.
    fn all_off(&mut self) {
        self.apply(OutputLines::default());
    }
}

// ───────────────────────────────────────────────────────────────
// Presentation sink (driven adapter: domain → display / LEDs)
// ───────────────────────────────────────────────────────────────

/// Receives the scheduler's visible state each tick. Fire-and-forget;
/// implementations must not block the control loop.
pub trait PresentationSink {
    fn present(&mut self, pump_active: bool, blower_phase: BlowerPhase);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, upload
/// queue, UI toast, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Settings store port (driven adapter: domain ↔ persistent record)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the schedule record.
///
/// `load` is infallible by contract: a missing or corrupt record is
/// replaced with defaults (and rewritten) inside the adapter, so the
/// domain always starts from a valid record.
pub trait SettingsStorePort {
    fn load(&mut self) -> ScheduleConfig;

    /// Persist the full record in one write.
    fn save(&mut self, cfg: &ScheduleConfig) -> Result<(), StoreError>;
}
