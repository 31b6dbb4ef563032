use crate::types::{EventCursor, SequencedEvent};
use sim_core::Tick;
use std::collections::VecDeque;

/// Bounded event log with cursor-based retrieval.
///
/// Once full, pushing drops the oldest event. Readers that fall behind
/// resume from the oldest event still retained.
pub struct EventBuffer<E> {
    events: VecDeque<SequencedEvent<E>>,
    capacity: usize,
    next_sequence: u64,
}

impl<E: Clone> EventBuffer<E> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            next_sequence: 0,
        }
    }

    pub fn push(&mut self, tick: Tick, event: E) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(SequencedEvent {
            sequence: self.next_sequence,
            tick,
            event,
        });
        self.next_sequence += 1;
    }

    /// Events with sequence >= `cursor`, plus the cursor to resume from.
    pub fn get_from_cursor(&self, cursor: EventCursor) -> (Vec<SequencedEvent<E>>, EventCursor) {
        let events = self
            .events
            .iter()
            .filter(|e| e.sequence >= cursor.0)
            .cloned()
            .collect();
        (events, EventCursor(self.next_sequence))
    }

    /// Number of events dropped so far because of overflow.
    pub fn dropped(&self) -> u64 {
        self.next_sequence - self.events.len() as u64
    }

    pub fn current_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
