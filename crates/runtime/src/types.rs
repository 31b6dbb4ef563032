use sim_core::{TerminalOutcome, Tick};

/// Tracks position in an event stream for cursor-based retrieval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EventCursor(pub u64);

/// Lifecycle of a live session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    Paused,
    Finished(TerminalOutcome),
    Terminated,
}

impl SessionStatus {
    pub fn is_over(self) -> bool {
        matches!(self, SessionStatus::Finished(_) | SessionStatus::Terminated)
    }
}

/// An event with the sequence number used for cursor tracking.
#[derive(Clone, Debug)]
pub struct SequencedEvent<E> {
    pub sequence: u64,
    pub tick: Tick,
    pub event: E,
}

/// Configuration for a live session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Simulation rate (ticks per second).
    pub tick_hz: u32,
    /// Capacity of the event ring buffer.
    pub event_buffer_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60,
            event_buffer_capacity: 4096,
        }
    }
}
