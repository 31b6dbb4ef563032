use sim_core::{Game, InputEnvelope, InputId, TerminalOutcome, Tick};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct RunResult<G: Game> {
    pub outcome: Option<TerminalOutcome>,
    pub final_tick: Tick,
    pub events: Vec<G::Event>,
}

/// Drives a single game run tick by tick, delivering scheduled inputs.
pub struct RunHost<G: Game> {
    game: G,
    current_tick: Tick,
    tick_hz: u32,
    next_input_id: InputId,
    pending_inputs: BTreeMap<Tick, Vec<InputEnvelope<G::Input>>>,
}

impl<G: Game> RunHost<G> {
    pub fn new(config: G::Config, seed: u64, tick_hz: u32) -> Self {
        Self {
            game: G::new(config, seed),
            current_tick: 0,
            tick_hz,
            next_input_id: 1,
            pending_inputs: BTreeMap::new(),
        }
    }

    /// Schedule an input for `intended_tick`.
    /// Inputs aimed at the current or a past tick run on the next tick.
    /// Returns the assigned input id and the tick it will run on.
    pub fn submit(&mut self, payload: G::Input, intended_tick: Tick) -> (InputId, Tick) {
        let scheduled_tick = intended_tick.max(self.current_tick + 1);
        let input_id = self.next_input_id;
        self.next_input_id += 1;

        self.pending_inputs
            .entry(scheduled_tick)
            .or_default()
            .push(InputEnvelope {
                input_id,
                intended_tick: scheduled_tick,
                payload,
            });

        (input_id, scheduled_tick)
    }

    /// Schedule an input for the very next tick.
    pub fn submit_now(&mut self, payload: G::Input) -> (InputId, Tick) {
        self.submit(payload, self.current_tick + 1)
    }

    pub fn run_for_ticks(&mut self, max_ticks: Tick) -> RunResult<G> {
        let mut all_events = Vec::new();

        for _ in 0..max_ticks {
            match self.step_one_tick() {
                Some(events) => all_events.extend(events),
                None => break,
            }
        }

        RunResult {
            outcome: self.game.is_terminal(),
            final_tick: self.current_tick,
            events: all_events,
        }
    }

    /// Advance by one tick. Returns None if the game is already terminal,
    /// otherwise the events produced during this tick.
    pub fn step_one_tick(&mut self) -> Option<Vec<G::Event>> {
        if self.game.is_terminal().is_some() {
            return None;
        }

        self.current_tick += 1;

        let mut inputs = self
            .pending_inputs
            .remove(&self.current_tick)
            .unwrap_or_default();
        inputs.sort_by_key(|i| i.input_id);

        let mut tick_events = Vec::new();
        self.game
            .step(self.current_tick, &inputs, &mut tick_events);

        Some(tick_events)
    }

    pub fn observe(&self) -> G::Observation {
        self.game.observe(self.current_tick)
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    pub fn pending_inputs(&self) -> usize {
        self.pending_inputs.values().map(Vec::len).sum()
    }

    pub fn is_terminal(&self) -> Option<TerminalOutcome> {
        self.game.is_terminal()
    }

    pub fn is_paused(&self) -> bool {
        self.game.is_paused()
    }
}
