//! Inbound commands to the control service.
//!
//! These represent actions requested by the outside world (settings
//! screens, physical buttons, serial console) that the
//! [`ControlService`](super::service::ControlService) interprets and acts
//! upon. Every settings mutation is validated and then persisted.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Set one node's low-temperature display threshold (°F).
    SetTempLow { node: usize, value_f: f32 },
    /// Set one node's over-temperature threshold (°F).
    SetTempHigh { node: usize, value_f: f32 },
    /// Set one node's dryness threshold (%).
    SetHumLow { node: usize, value_pct: f32 },

    /// Set the per-stage blower run length (seconds).
    SetBlowerDuration(u16),
    /// Set the pump run length (seconds).
    SetPumpDuration(u16),
    /// Set the scheduled-activation rearm interval (seconds).
    SetActivationInterval(u32),

    /// Change the settings-screen PIN (four ASCII digits).
    SetPin([u8; 4]),
    /// Enable or disable PIN protection.
    SetPinProtection(bool),

    /// Start a manual pump run (button or settings screen).
    ManualPump,
    /// Start a manual blower sequence.
    ManualBlower,
    /// Abort any run in progress.
    StopAll,
}
