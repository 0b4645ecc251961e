//! Integration tests: ControlService → scheduler → actuators → store.

use composter::app::commands::AppCommand;
use composter::app::events::AppEvent;
use composter::app::ports::{
    ActuatorPort, EventSink, PresentationSink, SensorPort, SettingsStorePort,
};
use composter::app::service::ControlService;
use composter::config::{NUM_SENSOR_NODES, ScheduleConfig};
use composter::error::StoreError;
use composter::scheduler::{
    BlowerPhase, OutputLines, PUMP_REARM_INTERVAL_SECS, TriggerKind,
};
use composter::sensors::{NodeReading, SensorSnapshot};

// ── Mock implementations ──────────────────────────────────────

struct MockHw {
    snapshot: SensorSnapshot,
    lines: OutputLines,
    apply_calls: usize,
}

impl MockHw {
    fn new() -> Self {
        Self {
            snapshot: nominal(),
            lines: OutputLines::default(),
            apply_calls: 0,
        }
    }
}

impl SensorPort for MockHw {
    fn snapshot(&mut self) -> SensorSnapshot {
        self.snapshot
    }
}

impl ActuatorPort for MockHw {
    fn apply(&mut self, lines: OutputLines) {
        self.lines = lines;
        self.apply_calls += 1;
    }
}

/// Store that keeps the record in memory and counts writes; can be told
/// to fail.
struct MockStore {
    record: Option<ScheduleConfig>,
    saves: usize,
    fail_saves: bool,
}

impl MockStore {
    fn new() -> Self {
        Self {
            record: None,
            saves: 0,
            fail_saves: false,
        }
    }
}

impl SettingsStorePort for MockStore {
    fn load(&mut self) -> ScheduleConfig {
        self.record.clone().unwrap_or_default()
    }

    fn save(&mut self, cfg: &ScheduleConfig) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Io);
        }
        self.record = Some(cfg.clone());
        self.saves += 1;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

#[derive(Default)]
struct RecordingPresentation {
    frames: Vec<(bool, BlowerPhase)>,
}

impl PresentationSink for RecordingPresentation {
    fn present(&mut self, pump_active: bool, blower_phase: BlowerPhase) {
        self.frames.push((pump_active, blower_phase));
    }
}

// ── Snapshot helpers ──────────────────────────────────────────

fn nominal() -> SensorSnapshot {
    SensorSnapshot {
        nodes: [NodeReading::present(49.0, 55.0); NUM_SENSOR_NODES],
    }
}

fn dry() -> SensorSnapshot {
    let mut s = nominal();
    s.nodes[0].humidity_pct = Some(30.0);
    s
}

fn hot() -> SensorSnapshot {
    let mut s = nominal();
    // ~165 °F, over the 160 °F default threshold.
    s.nodes[1].temperature_c = Some(74.0);
    s
}

struct Rig {
    svc: ControlService,
    hw: MockHw,
    store: MockStore,
    sink: RecordingSink,
    present: RecordingPresentation,
}

impl Rig {
    fn new(cfg: ScheduleConfig) -> Self {
        Self {
            svc: ControlService::new(cfg),
            hw: MockHw::new(),
            store: MockStore::new(),
            sink: RecordingSink::default(),
            present: RecordingPresentation::default(),
        }
    }

    fn tick(&mut self, ms: u32, epoch: Option<u32>) {
        self.svc.tick(
            ms,
            epoch,
            &mut self.hw,
            &mut self.store,
            &mut self.sink,
            &mut self.present,
        );
    }

    fn command(&mut self, cmd: AppCommand, ms: u32, epoch: Option<u32>) {
        self.svc
            .handle_command(cmd, ms, epoch, &mut self.hw, &mut self.store, &mut self.sink);
    }
}

const T0: u32 = 1_750_000_000;

// ── Scenario A: fresh boot, dry sensor ────────────────────────

#[test]
fn fresh_boot_dry_sensor_runs_pump_and_persists() {
    let mut rig = Rig::new(ScheduleConfig::default());
    // Quiet the scheduled blower path so the pump is isolated.
    rig.command(AppCommand::SetActivationInterval(4_000_000_000), 0, None);
    let saves_before = rig.store.saves;
    rig.hw.snapshot = dry();

    rig.tick(0, Some(T0));

    assert!(rig.hw.lines.pump);
    assert!(!rig.hw.lines.blower_1 && !rig.hw.lines.blower_2);
    assert_eq!(rig.store.saves, saves_before + 1);
    let persisted = rig.store.record.clone().unwrap();
    assert_eq!(persisted.last_pump_epoch, T0);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::PumpStarted { manual: false }));
    assert_eq!(rig.present.frames.last(), Some(&(true, BlowerPhase::Idle)));
}

// ── Rearm invariant across restart ────────────────────────────

#[test]
fn pump_rearm_survives_restart_through_persisted_record() {
    let mut store = MockStore::new();

    // First boot: pump fires and its epoch is persisted.
    {
        let mut rig = Rig::new(ScheduleConfig {
            activation_interval_sec: 4_000_000_000,
            ..ScheduleConfig::default()
        });
        rig.hw.snapshot = dry();
        rig.tick(0, Some(T0));
        assert!(rig.hw.lines.pump);
        store.record = rig.store.record.clone();
        assert!(store.record.is_some());
    }

    // Restart: a fresh service loads the persisted record. Still dry,
    // still inside the rearm window.
    {
        let mut rig = Rig::new(store.load());
        rig.hw.snapshot = dry();
        rig.tick(0, Some(T0 + PUMP_REARM_INTERVAL_SECS - 60));
        assert!(!rig.hw.lines.pump);

        rig.tick(1_000, Some(T0 + PUMP_REARM_INTERVAL_SECS));
        assert!(rig.hw.lines.pump);
    }
}

// ── Scheduled and override blower paths ───────────────────────

#[test]
fn scheduled_blower_runs_both_stages_through_service() {
    let mut rig = Rig::new(ScheduleConfig {
        last_pump_epoch: T0,
        last_blower_epoch: T0 - 3600,
        blower_duration_sec: 10,
        ..ScheduleConfig::default()
    });

    rig.tick(0, Some(T0));
    assert!(rig.hw.lines.blower_1);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::BlowerStarted(TriggerKind::Scheduled)));

    rig.tick(10_000, Some(T0 + 10));
    assert!(!rig.hw.lines.blower_1 && rig.hw.lines.blower_2);

    rig.tick(20_000, Some(T0 + 20));
    assert_eq!(rig.hw.lines, OutputLines::default());
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::BlowerPhaseChanged(BlowerPhase::Idle)));
    // One persistence write for the whole sequence, at trigger time.
    assert_eq!(rig.store.saves, 1);
}

#[test]
fn over_temp_override_fires_before_schedule_would() {
    let mut rig = Rig::new(ScheduleConfig {
        last_pump_epoch: T0,
        last_blower_epoch: T0 - 1300,
        ..ScheduleConfig::default()
    });
    rig.hw.snapshot = hot();

    rig.tick(0, Some(T0));
    assert!(rig.hw.lines.blower_1);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::BlowerStarted(TriggerKind::OverTemp)));
}

// ── Mutual exclusion ──────────────────────────────────────────

#[test]
fn outputs_never_combine_pump_and_blower() {
    let mut rig = Rig::new(ScheduleConfig::default()); // everything overdue
    let mut snap = dry();
    snap.nodes[1].temperature_c = Some(74.0);
    rig.hw.snapshot = snap;

    for i in 0..12_000u32 {
        rig.tick(i * 1000, Some(T0 + i));
        let l = rig.hw.lines;
        assert!(
            !(l.pump && (l.blower_1 || l.blower_2)),
            "pump and blower active together at tick {}",
            i
        );
        assert!(!(l.blower_1 && l.blower_2), "both stages high at tick {}", i);
    }
}

// ── No-op idempotence ─────────────────────────────────────────

#[test]
fn settled_loop_never_writes_storage() {
    let mut rig = Rig::new(ScheduleConfig {
        last_pump_epoch: T0,
        last_blower_epoch: T0,
        ..ScheduleConfig::default()
    });

    for i in 0..600u32 {
        rig.tick(i * 1000, Some(T0 + i));
    }

    assert_eq!(rig.store.saves, 0);
    assert!(rig.sink.events.is_empty());
    assert_eq!(rig.hw.lines, OutputLines::default());
    // Presentation is notified every tick regardless.
    assert_eq!(rig.present.frames.len(), 600);
}

// ── Manual runs ───────────────────────────────────────────────

#[test]
fn manual_runs_drive_hardware_but_never_persist() {
    let mut rig = Rig::new(ScheduleConfig {
        last_pump_epoch: T0,
        last_blower_epoch: T0,
        ..ScheduleConfig::default()
    });

    rig.command(AppCommand::ManualBlower, 0, Some(T0));
    assert!(rig.hw.lines.blower_1);
    assert_eq!(rig.store.saves, 0);

    // Stop mid-run from the stop button.
    rig.command(AppCommand::StopAll, 2_000, Some(T0 + 2));
    assert_eq!(rig.hw.lines, OutputLines::default());
    assert_eq!(rig.store.saves, 0);

    // The persisted epochs were never touched by the manual path.
    rig.tick(3_000, Some(T0 + 3));
    assert_eq!(rig.svc.config().last_blower_epoch, T0);
}

#[test]
fn manual_pump_rejected_while_blower_sequence_runs() {
    let mut rig = Rig::new(ScheduleConfig {
        last_pump_epoch: T0,
        last_blower_epoch: T0,
        ..ScheduleConfig::default()
    });

    rig.command(AppCommand::ManualBlower, 0, Some(T0));
    let events_before = rig.sink.events.len();

    rig.command(AppCommand::ManualPump, 1_000, Some(T0 + 1));
    assert!(!rig.hw.lines.pump);
    assert_eq!(rig.sink.events.len(), events_before);
}

// ── Settings mutations ────────────────────────────────────────

#[test]
fn threshold_change_persists_and_takes_effect() {
    let mut rig = Rig::new(ScheduleConfig {
        last_pump_epoch: T0,
        last_blower_epoch: T0 - 1300,
        ..ScheduleConfig::default()
    });

    // 150 °F threshold: the 149 °F node (65 °C) is not yet hot.
    let mut snap = nominal();
    snap.nodes[2].temperature_c = Some(65.0);
    rig.hw.snapshot = snap;
    rig.tick(0, Some(T0));
    assert!(!rig.hw.lines.blower_1);

    rig.command(
        AppCommand::SetTempHigh {
            node: 2,
            value_f: 145.0,
        },
        1_000,
        Some(T0 + 1),
    );
    assert_eq!(rig.store.saves, 1);
    assert_eq!(rig.store.record.as_ref().unwrap().temp_high_f[2], 145.0);

    // Same reading now exceeds the lowered threshold.
    rig.tick(2_000, Some(T0 + 2));
    assert!(rig.hw.lines.blower_1);
}

// ── Persistence failure is non-fatal ──────────────────────────

#[test]
fn save_failure_keeps_control_loop_running() {
    let mut rig = Rig::new(ScheduleConfig {
        last_pump_epoch: T0,
        last_blower_epoch: T0 - 3600,
        blower_duration_sec: 10,
        ..ScheduleConfig::default()
    });
    rig.store.fail_saves = true;

    rig.tick(0, Some(T0));
    assert!(rig.hw.lines.blower_1);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::SaveFailed(StoreError::Io)));

    // In-memory state remains authoritative and the sequence completes.
    rig.tick(10_000, Some(T0 + 10));
    assert!(rig.hw.lines.blower_2);
    rig.tick(20_000, Some(T0 + 20));
    assert_eq!(rig.hw.lines, OutputLines::default());
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_reflects_current_state_and_serializes() {
    let mut rig = Rig::new(ScheduleConfig {
        last_pump_epoch: T0,
        last_blower_epoch: T0 - 3600,
        ..ScheduleConfig::default()
    });

    rig.tick(0, Some(T0));
    let t = rig.svc.telemetry(Some(T0 + 1));

    assert_eq!(t.epoch_s, T0 + 1);
    assert!(!t.pump_active);
    assert_eq!(t.blower_phase, "run1");
    assert_eq!(t.last_blower_epoch, T0);

    let json = serde_json::to_string(&t).unwrap();
    assert!(json.contains("\"blower_phase\":\"run1\""));
    assert!(json.contains("\"connected\":true"));
}
