//! Actuation history for the diagnostics screen.
//!
//! In-memory ring buffer of the most recent actuation events: what ran,
//! which trigger started it, and when. Read-only consumers (history screen,
//! telemetry) iterate oldest-first. Deliberately volatile; only the trigger
//! epochs in the persisted record survive a reboot.

use serde::{Deserialize, Serialize};

use crate::scheduler::TriggerKind;

/// Ring capacity. At the nominal one actuation per hour this covers about
/// two days of history.
pub const HISTORY_SLOTS: usize = 48;

/// What ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActuationKind {
    /// Pump run started by the dryness trigger.
    PumpDryness,
    /// Pump run started from a button or settings screen.
    PumpManual,
    /// Blower sequence; scheduled, over-temperature or manual.
    Blower(BlowerTrigger),
}

/// Serializable mirror of [`TriggerKind`] for history entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlowerTrigger {
    Scheduled,
    OverTemp,
    Manual,
}

impl From<TriggerKind> for BlowerTrigger {
    fn from(kind: TriggerKind) -> Self {
        match kind {
            TriggerKind::Scheduled => Self::Scheduled,
            TriggerKind::OverTemp => Self::OverTemp,
            TriggerKind::Manual => Self::Manual,
        }
    }
}

/// One actuation event. `epoch_s` is zero when the run started while the
/// wall clock was unsynced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub epoch_s: u32,
    pub kind: ActuationKind,
}

/// Fixed-capacity ring of recent actuations, oldest evicted first.
#[derive(Debug, Default)]
pub struct ActuationHistory {
    entries: heapless::Deque<HistoryEntry, HISTORY_SLOTS>,
}

impl ActuationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, evicting the oldest when full.
    pub fn record(&mut self, epoch_s: u32, kind: ActuationKind) {
        if self.entries.is_full() {
            self.entries.pop_front();
        }
        // Cannot fail after the pop above.
        let _ = self.entries.push_back(HistoryEntry { epoch_s, kind });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest-first iteration.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let h = ActuationHistory::new();
        assert!(h.is_empty());
        assert_eq!(h.latest(), None);
    }

    #[test]
    fn records_in_order() {
        let mut h = ActuationHistory::new();
        h.record(100, ActuationKind::PumpDryness);
        h.record(200, ActuationKind::Blower(BlowerTrigger::Scheduled));

        let epochs: Vec<u32> = h.iter().map(|e| e.epoch_s).collect();
        assert_eq!(epochs, vec![100, 200]);
        assert_eq!(h.latest().map(|e| e.epoch_s), Some(200));
    }

    #[test]
    fn ring_evicts_oldest() {
        let mut h = ActuationHistory::new();
        for i in 0..HISTORY_SLOTS as u32 + 5 {
            h.record(i, ActuationKind::PumpManual);
        }
        assert_eq!(h.len(), HISTORY_SLOTS);
        assert_eq!(h.iter().next().map(|e| e.epoch_s), Some(5));
        assert_eq!(h.latest().map(|e| e.epoch_s), Some(HISTORY_SLOTS as u32 + 4));
    }

    #[test]
    fn trigger_kind_converts() {
        assert_eq!(
            BlowerTrigger::from(TriggerKind::OverTemp),
            BlowerTrigger::OverTemp
        );
        assert_eq!(
            BlowerTrigger::from(TriggerKind::Manual),
            BlowerTrigger::Manual
        );
    }

    #[test]
    fn clear_empties_ring() {
        let mut h = ActuationHistory::new();
        h.record(1, ActuationKind::PumpDryness);
        h.clear();
        assert!(h.is_empty());
    }
}
