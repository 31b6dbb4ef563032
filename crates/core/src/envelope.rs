use crate::types::{InputId, Tick};

/// A player input scheduled for a specific tick.
#[derive(Clone, Debug)]
pub struct InputEnvelope<I> {
    pub input_id: InputId,
    pub intended_tick: Tick,
    pub payload: I,
}
