//! Control service — the hexagonal core.
//!
//! [`ControlService`] owns the persisted record, the actuation scheduler
//! and the history ring. It exposes a clean, hardware-agnostic API; all
//! I/O flows through port traits injected at call sites, making the whole
//! service testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                  │      ControlService       │ ──▶ PresentationSink
//! ActuatorPort ◀── │  Scheduler · Settings     │
//!                  │  History  · Telemetry     │ ◀─▶ SettingsStorePort
//!                  └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::{NUM_SENSOR_NODES, ScheduleConfig};
use crate::diagnostics::{ActuationHistory, ActuationKind};
use crate::scheduler::{ActuationScheduler, BlowerPhase, TriggerKind};
use crate::sensors::SensorSnapshot;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, EventSink, PresentationSink, SensorPort, SettingsStorePort};

/// Orchestrates one control cycle per second and funnels every settings
/// mutation through validation and persistence.
pub struct ControlService {
    cfg: ScheduleConfig,
    scheduler: ActuationScheduler,
    history: ActuationHistory,
    last_snapshot: SensorSnapshot,
    tick_count: u64,
}

impl ControlService {
    /// Construct from an already-loaded record (the store adapter
    /// guarantees it is valid).
    pub fn new(cfg: ScheduleConfig) -> Self {
        Self {
            cfg,
            scheduler: ActuationScheduler::new(),
            history: ActuationHistory::new(),
            last_snapshot: SensorSnapshot::default(),
            tick_count: 0,
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: read sensors → scheduler → actuators →
    /// events → persistence → presentation.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`] — this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        now_uptime_ms: u32,
        now_epoch_s: Option<u32>,
        hw: &mut (impl SensorPort + ActuatorPort),
        store: &mut impl SettingsStorePort,
        sink: &mut impl EventSink,
        present: &mut impl PresentationSink,
    ) {
        self.tick_count += 1;

        let snapshot = hw.snapshot();
        self.last_snapshot = snapshot;

        let fx = self
            .scheduler
            .tick(now_uptime_ms, now_epoch_s, &snapshot, &mut self.cfg);
        hw.apply(fx.outputs);

        let epoch = now_epoch_s.unwrap_or(0);
        if fx.pump_started {
            sink.emit(&AppEvent::PumpStarted { manual: false });
            self.history.record(epoch, ActuationKind::PumpDryness);
        }
        if fx.pump_finished {
            sink.emit(&AppEvent::PumpStopped);
        }
        if let Some(kind) = fx.blower_started {
            sink.emit(&AppEvent::BlowerStarted(kind));
            sink.emit(&AppEvent::BlowerPhaseChanged(BlowerPhase::Run1));
            self.history.record(epoch, ActuationKind::Blower(kind.into()));
        }
        if fx.blower_advanced {
            sink.emit(&AppEvent::BlowerPhaseChanged(BlowerPhase::Run2));
        }
        if fx.blower_finished {
            sink.emit(&AppEvent::BlowerPhaseChanged(BlowerPhase::Idle));
        }

        if fx.persist {
            self.save(store, sink);
        }

        present.present(self.scheduler.pump_active(), self.scheduler.blower_phase());
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (button, settings screen, console).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_uptime_ms: u32,
        now_epoch_s: Option<u32>,
        hw: &mut impl ActuatorPort,
        store: &mut impl SettingsStorePort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::ManualPump => {
                if self.scheduler.request_pump_run(now_uptime_ms, &self.cfg) {
                    hw.apply(self.scheduler.output_lines());
                    sink.emit(&AppEvent::PumpStarted { manual: true });
                    self.history
                        .record(now_epoch_s.unwrap_or(0), ActuationKind::PumpManual);
                } else {
                    info!("manual pump request rejected: actuator busy");
                }
            }
            AppCommand::ManualBlower => {
                if self.scheduler.request_blower_run(now_uptime_ms, &self.cfg) {
                    hw.apply(self.scheduler.output_lines());
                    sink.emit(&AppEvent::BlowerStarted(TriggerKind::Manual));
                    sink.emit(&AppEvent::BlowerPhaseChanged(BlowerPhase::Run1));
                    self.history.record(
                        now_epoch_s.unwrap_or(0),
                        ActuationKind::Blower(TriggerKind::Manual.into()),
                    );
                } else {
                    info!("manual blower request rejected: actuator busy");
                }
            }
            AppCommand::StopAll => {
                let was_pump = self.scheduler.pump_active();
                let was_blower = self.scheduler.blower_phase() != BlowerPhase::Idle;
                if self.scheduler.stop_all() {
                    hw.all_off();
                    if was_pump {
                        sink.emit(&AppEvent::PumpStopped);
                    }
                    if was_blower {
                        sink.emit(&AppEvent::BlowerPhaseChanged(BlowerPhase::Idle));
                    }
                    info!("manual stop: all actuators off");
                }
            }
            _ => self.apply_setting(cmd, store, sink),
        }
    }

    /// Mutate one settings field. The change is applied to a scratch copy,
    /// validated as a whole record, then committed and persisted; an
    /// invalid mutation is dropped without touching the live record.
    fn apply_setting(
        &mut self,
        cmd: AppCommand,
        store: &mut impl SettingsStorePort,
        sink: &mut impl EventSink,
    ) {
        let mut candidate = self.cfg.clone();
        match cmd {
            AppCommand::SetTempLow { node, value_f } if node < NUM_SENSOR_NODES => {
                candidate.temp_low_f[node] = value_f;
            }
            AppCommand::SetTempHigh { node, value_f } if node < NUM_SENSOR_NODES => {
                candidate.temp_high_f[node] = value_f;
            }
            AppCommand::SetHumLow { node, value_pct } if node < NUM_SENSOR_NODES => {
                candidate.hum_low_pct[node] = value_pct;
            }
            AppCommand::SetBlowerDuration(sec) => candidate.blower_duration_sec = sec,
            AppCommand::SetPumpDuration(sec) => candidate.pump_duration_sec = sec,
            AppCommand::SetActivationInterval(sec) => candidate.activation_interval_sec = sec,
            AppCommand::SetPin(pin) => candidate.user_pin = pin,
            AppCommand::SetPinProtection(on) => candidate.pin_protection_enabled = on,
            other => {
                warn!("settings command out of range: {:?}", other);
                return;
            }
        }

        if let Err(e) = candidate.validate() {
            warn!("settings change rejected: {}", e);
            return;
        }

        self.cfg = candidate;
        sink.emit(&AppEvent::SettingsChanged);
        self.save(store, sink);
    }

    fn save(&mut self, store: &mut impl SettingsStorePort, sink: &mut impl EventSink) {
        match store.save(&self.cfg) {
            Ok(()) => sink.emit(&AppEvent::SettingsSaved),
            Err(e) => {
                // Non-fatal: the in-memory record stays authoritative and
                // the next trigger fire retries the write.
                warn!("settings save failed: {}", e);
                sink.emit(&AppEvent::SaveFailed(e));
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current state.
    pub fn telemetry(&self, now_epoch_s: Option<u32>) -> TelemetryData {
        TelemetryData {
            epoch_s: now_epoch_s.unwrap_or(0),
            sensors: self.last_snapshot,
            pump_active: self.scheduler.pump_active(),
            blower_phase: self.scheduler.blower_phase().as_str(),
            last_pump_epoch: self.cfg.last_pump_epoch,
            last_blower_epoch: self.cfg.last_blower_epoch,
        }
    }

    /// Whether the settings screens should ask for the PIN at all.
    pub fn pin_required(&self) -> bool {
        self.cfg.pin_protection_enabled
    }

    pub fn pin_matches(&self, entered: &[u8; 4]) -> bool {
        self.cfg.user_pin == *entered
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.cfg
    }

    pub fn pump_active(&self) -> bool {
        self.scheduler.pump_active()
    }

    pub fn blower_phase(&self) -> BlowerPhase {
        self.scheduler.blower_phase()
    }

    pub fn history(&self) -> &ActuationHistory {
        &self.history
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
