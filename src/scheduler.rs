//! Environmental actuation scheduler.
//!
//! Decides, once per control-loop tick, whether the irrigation pump or the
//! two-stage blower sequence should start or stop.  Three trigger paths:
//!
//! * **Dryness** starts the pump when any connected node reads below its
//!   low-humidity threshold and the pump rearm interval has elapsed.
//! * **Scheduled** starts the blower sequence when the configured activation
//!   interval has elapsed since the last blower trigger.
//! * **Over-temperature** starts the blower sequence early (shorter rearm)
//!   when any connected node reads at or above its high-temperature
//!   threshold; one-shot per excursion.
//!
//! The scheduler is pure with respect to hardware: [`tick`] takes explicit
//! timestamps and a sensor snapshot and returns a [`TickEffects`] describing
//! the desired output lines and whether the persisted record changed.  All
//! GPIO and storage side effects happen in the service layer.
//!
//! [`tick`]: ActuationScheduler::tick

use crate::config::{NUM_SENSOR_NODES, ScheduleConfig};
use crate::sensors::SensorSnapshot;

/// Minimum wall-clock seconds between pump triggers.
pub const PUMP_REARM_INTERVAL_SECS: u32 = 3600;

/// The over-temperature override rearms after `activation_interval_sec`
/// divided by this, so heat excursions get relief faster than the routine
/// schedule while still being rate-limited.
pub const OVER_TEMP_REARM_DIVISOR: u32 = 3;

/// Blower sequence phase.  The two stages run back to back, equal duration,
/// never simultaneously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlowerPhase {
    #[default]
    Idle,
    Run1,
    Run2,
}

impl BlowerPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Run1 => "run1",
            Self::Run2 => "run2",
        }
    }
}

/// Which path started a blower sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Scheduled,
    OverTemp,
    Manual,
}

impl TriggerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::OverTemp => "over-temp",
            Self::Manual => "manual",
        }
    }
}

/// Desired state of the three SSR output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputLines {
    pub pump: bool,
    pub blower_1: bool,
    pub blower_2: bool,
}

/// What a single tick decided.  The service layer applies `outputs`, emits
/// events for the `Option`/`bool` transitions, and saves the record iff
/// `persist` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickEffects {
    pub outputs: OutputLines,
    /// A trigger fired and mutated the persisted epochs this tick.
    pub persist: bool,
    pub pump_started: bool,
    pub pump_finished: bool,
    pub blower_started: Option<TriggerKind>,
    /// `Run1 -> Run2` happened this tick.
    pub blower_advanced: bool,
    pub blower_finished: bool,
}

/// Pump and blower state machines plus the over-temperature one-shot latch.
///
/// All of this is volatile: a reboot starts from everything off, only the
/// trigger epochs inside [`ScheduleConfig`] survive.
#[derive(Debug, Default)]
pub struct ActuationScheduler {
    pump_active: bool,
    pump_start_uptime_ms: u32,
    pump_run_ms: u32,
    blower_phase: BlowerPhase,
    phase_start_uptime_ms: u32,
    phase_run_ms: u32,
    over_temp_oneshot: bool,
}

impl ActuationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pump_active(&self) -> bool {
        self.pump_active
    }

    pub fn blower_phase(&self) -> BlowerPhase {
        self.blower_phase
    }

    /// Output lines implied by the current state.
    pub fn output_lines(&self) -> OutputLines {
        OutputLines {
            pump: self.pump_active,
            blower_1: self.blower_phase == BlowerPhase::Run1,
            blower_2: self.blower_phase == BlowerPhase::Run2,
        }
    }

    /// Advance the state machines by one tick.
    ///
    /// `now_epoch_s` is `None` while the wall clock is unsynced; trigger
    /// evaluation is suppressed for that tick (epoch comparisons would be
    /// meaningless and must not poison the persisted timestamps) but
    /// uptime-based run expiry still advances, so an in-flight run always
    /// completes.
    pub fn tick(
        &mut self,
        now_uptime_ms: u32,
        now_epoch_s: Option<u32>,
        sensors: &SensorSnapshot,
        cfg: &mut ScheduleConfig,
    ) -> TickEffects {
        let mut fx = TickEffects::default();

        // Run expiry first, so a trigger can re-fire on the very tick an
        // actuator stops only if its rearm interval genuinely allows it.
        if self.pump_active
            && now_uptime_ms.wrapping_sub(self.pump_start_uptime_ms) >= self.pump_run_ms
        {
            self.pump_active = false;
            fx.pump_finished = true;
        }
        match self.blower_phase {
            BlowerPhase::Run1
                if now_uptime_ms.wrapping_sub(self.phase_start_uptime_ms)
                    >= self.phase_run_ms =>
            {
                self.blower_phase = BlowerPhase::Run2;
                self.phase_start_uptime_ms = now_uptime_ms;
                fx.blower_advanced = true;
            }
            BlowerPhase::Run2
                if now_uptime_ms.wrapping_sub(self.phase_start_uptime_ms)
                    >= self.phase_run_ms =>
            {
                self.blower_phase = BlowerPhase::Idle;
                fx.blower_finished = true;
            }
            _ => {}
        }

        // One-shot rearm is level-checked every tick regardless of phase:
        // the override may only fire again after the temperature actually
        // dropped, not merely after the rearm timer elapsed.
        if !any_over_temp(sensors, cfg) {
            self.over_temp_oneshot = false;
        }

        if let Some(epoch) = now_epoch_s {
            self.evaluate_triggers(now_uptime_ms, epoch, sensors, cfg, &mut fx);
        }

        fx.outputs = self.output_lines();
        fx
    }

    fn evaluate_triggers(
        &mut self,
        now_uptime_ms: u32,
        now_epoch_s: u32,
        sensors: &SensorSnapshot,
        cfg: &mut ScheduleConfig,
        fx: &mut TickEffects,
    ) {
        // Pump: dryness on any connected node, rearm elapsed, blower idle.
        if !self.pump_active
            && self.blower_phase == BlowerPhase::Idle
            && any_dry(sensors, cfg)
            && now_epoch_s.saturating_sub(cfg.last_pump_epoch) >= PUMP_REARM_INTERVAL_SECS
        {
            self.start_pump(now_uptime_ms, cfg);
            cfg.last_pump_epoch = now_epoch_s;
            fx.pump_started = true;
            fx.persist = true;
        }

        if self.blower_phase != BlowerPhase::Idle || self.pump_active {
            return;
        }
        let since_blower = now_epoch_s.saturating_sub(cfg.last_blower_epoch);

        // Scheduled path wins a same-tick tie; either path consumes the
        // shared epoch, so firing one re-arms the other identically.
        if since_blower >= cfg.activation_interval_sec {
            self.start_blower(now_uptime_ms, cfg);
            cfg.last_blower_epoch = now_epoch_s;
            fx.blower_started = Some(TriggerKind::Scheduled);
            fx.persist = true;
        } else if !self.over_temp_oneshot
            && any_over_temp(sensors, cfg)
            && since_blower >= cfg.activation_interval_sec / OVER_TEMP_REARM_DIVISOR
        {
            self.start_blower(now_uptime_ms, cfg);
            cfg.last_blower_epoch = now_epoch_s;
            self.over_temp_oneshot = true;
            fx.blower_started = Some(TriggerKind::OverTemp);
            fx.persist = true;
        }
    }

    /// Start a manual pump run with the configured duration.  Rejected while
    /// the pump is already running or the blower sequence is active; manual
    /// runs never touch the persisted epochs.
    pub fn request_pump_run(&mut self, now_uptime_ms: u32, cfg: &ScheduleConfig) -> bool {
        if self.pump_active || self.blower_phase != BlowerPhase::Idle {
            return false;
        }
        self.start_pump(now_uptime_ms, cfg);
        true
    }

    /// Start a manual blower sequence.  Same rejection and persistence rules
    /// as [`request_pump_run`](Self::request_pump_run).
    pub fn request_blower_run(&mut self, now_uptime_ms: u32, cfg: &ScheduleConfig) -> bool {
        if self.pump_active || self.blower_phase != BlowerPhase::Idle {
            return false;
        }
        self.start_blower(now_uptime_ms, cfg);
        true
    }

    /// Abort any run in progress.  Returns true if something was running.
    pub fn stop_all(&mut self) -> bool {
        let was_running = self.pump_active || self.blower_phase != BlowerPhase::Idle;
        self.pump_active = false;
        self.blower_phase = BlowerPhase::Idle;
        was_running
    }

    fn start_pump(&mut self, now_uptime_ms: u32, cfg: &ScheduleConfig) {
        self.pump_active = true;
        self.pump_start_uptime_ms = now_uptime_ms;
        // Run length is latched at start; a settings change mid-run does not
        // stretch or cut the run in flight.
        self.pump_run_ms = u32::from(cfg.pump_duration_sec) * 1000;
    }

    fn start_blower(&mut self, now_uptime_ms: u32, cfg: &ScheduleConfig) {
        self.blower_phase = BlowerPhase::Run1;
        self.phase_start_uptime_ms = now_uptime_ms;
        self.phase_run_ms = u32::from(cfg.blower_duration_sec) * 1000;
    }
}

fn celsius_to_fahrenheit(c: f32) -> f32 {
    c * 9.0 / 5.0 + 32.0
}

/// Any connected node at or above its high-temperature threshold.
/// Disconnected or absent readings count as "not hot".
fn any_over_temp(sensors: &SensorSnapshot, cfg: &ScheduleConfig) -> bool {
    (0..NUM_SENSOR_NODES).any(|i| {
        let node = &sensors.nodes[i];
        node.connected
            && node
                .temperature_c
                .is_some_and(|c| celsius_to_fahrenheit(c) >= cfg.temp_high_f[i])
    })
}

/// Any connected node below its low-humidity threshold.  Site-wide OR:
/// under-watering any zone is worse than over-watering.
fn any_dry(sensors: &SensorSnapshot, cfg: &ScheduleConfig) -> bool {
    (0..NUM_SENSOR_NODES).any(|i| {
        let node = &sensors.nodes[i];
        node.connected
            && node
                .humidity_pct
                .is_some_and(|h| h < cfg.hum_low_pct[i])
    })
}
