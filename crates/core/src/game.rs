use crate::envelope::InputEnvelope;
use crate::types::Tick;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalOutcome {
    Win,
    Lose,
}

/// A deterministic, fixed-rate simulation.
///
/// Given the same config, seed and input schedule, `step` must produce the
/// same sequence of states and events.
pub trait Game: Sized {
    type Config: Clone + Send + Sync + 'static;
    type Input: Clone + Send + Sync + 'static;
    type Observation: Clone + Send + Sync + 'static;
    type Event: Clone + Send + Sync + 'static;

    fn new(config: Self::Config, seed: u64) -> Self;

    fn step(
        &mut self,
        tick: Tick,
        inputs: &[InputEnvelope<Self::Input>],
        out_events: &mut Vec<Self::Event>,
    );

    fn observe(&self, tick: Tick) -> Self::Observation;

    fn is_terminal(&self) -> Option<TerminalOutcome>;

    /// Whether the simulation is currently frozen (menus, level-up choice).
    /// Paused games are still stepped so they can consume inputs.
    fn is_paused(&self) -> bool {
        false
    }
}
