//! Main-loop event system.
//!
//! Events are produced by timer callbacks (control tick, telemetry tick)
//! and the polled buttons, and consumed by the main loop one at a time in
//! FIFO order.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Timer        │────▶│              │     │              │
//! │ Buttons      │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Software     │────▶│  (lock-free) │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending events.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 16;

/// Loop event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// Scheduler control tick (1 Hz).
    ControlTick = 0,
    /// Telemetry report timer fired.
    TelemetryTick = 1,
    /// Debounced manual pump button press.
    ButtonPump = 10,
    /// Debounced manual blower button press.
    ButtonBlower = 11,
    /// Debounced stop button press.
    ButtonStop = 12,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// Timer/button context writes (produce), main loop reads (consume).
// The buffer lives in a static so timer callbacks can reach it without
// carrying state.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: single producer (timer/button poll context), single consumer
// (main loop). The head/tail atomics enforce the SPSC discipline; each
// slot is written before the head moves past it and read before the tail
// does.
static mut EVENT_BUFFER: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push an event into the queue. Lock-free; returns `false` if the queue
/// is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false;
    }

    // SAFETY: single producer; this slot is outside the consumer's
    // visible range until the Release store below.
    unsafe {
        EVENT_BUFFER[head as usize] = event as u8;
    }

    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event (main loop, single consumer). `None` when empty.
pub fn pop_event() -> Option<Event> {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None;
    }

    // SAFETY: single consumer; the producer published this slot with the
    // Release store of head.
    let raw = unsafe { EVENT_BUFFER[tail as usize] };
    EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

    event_from_u8(raw)
}

/// Drain all pending events into a callback, FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Number of pending events.
pub fn queue_len() -> usize {
    let head = EVENT_HEAD.load(Ordering::Relaxed) as usize;
    let tail = EVENT_TAIL.load(Ordering::Relaxed) as usize;
    (head + EVENT_QUEUE_CAP - tail) % EVENT_QUEUE_CAP
}

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        0 => Some(Event::ControlTick),
        1 => Some(Event::TelemetryTick),
        10 => Some(Event::ButtonPump),
        11 => Some(Event::ButtonBlower),
        12 => Some(Event::ButtonStop),
        _ => None,
    }
}
