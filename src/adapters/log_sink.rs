//! Log-based event and presentation sinks.
//!
//! [`LogEventSink`] writes structured application events to the ESP-IDF
//! logger (UART / USB-CDC in production). Telemetry goes out as one JSON
//! line per snapshot so a serial capture doubles as a data log.
//!
//! [`LogPresentation`] is the headless stand-in for the display: it logs
//! the visible pump/blower state, but only when it changes.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, PresentationSink};
use crate::scheduler::BlowerPhase;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => match serde_json::to_string(t) {
                Ok(json) => info!("TELEM | {}", json),
                Err(e) => warn!("TELEM | serialize failed: {}", e),
            },
            AppEvent::PumpStarted { manual } => {
                info!(
                    "PUMP  | started ({})",
                    if *manual { "manual" } else { "dryness" }
                );
            }
            AppEvent::PumpStopped => info!("PUMP  | stopped"),
            AppEvent::BlowerStarted(kind) => {
                info!("BLOWR | sequence started ({})", kind.as_str());
            }
            AppEvent::BlowerPhaseChanged(phase) => {
                info!("BLOWR | phase -> {}", phase.as_str());
            }
            AppEvent::SettingsChanged => info!("CONF  | settings changed"),
            AppEvent::SettingsSaved => info!("CONF  | record saved"),
            AppEvent::SaveFailed(e) => warn!("CONF  | record save failed: {}", e),
        }
    }
}

/// Logs the displayed actuator state on change only, so a settled loop
/// stays quiet.
pub struct LogPresentation {
    last: Option<(bool, BlowerPhase)>,
}

impl LogPresentation {
    pub fn new() -> Self {
        Self { last: None }
    }
}

impl Default for LogPresentation {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationSink for LogPresentation {
    fn present(&mut self, pump_active: bool, blower_phase: BlowerPhase) {
        let state = (pump_active, blower_phase);
        if self.last != Some(state) {
            info!(
                "SHOW  | pump={} blower={}",
                if pump_active { "ON" } else { "off" },
                blower_phase.as_str()
            );
            self.last = Some(state);
        }
    }
}
