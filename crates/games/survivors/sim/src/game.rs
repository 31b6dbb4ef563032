use crate::actions::SurvivorsInput;
use crate::config::SurvivorsConfig;
use crate::events::SurvivorsEvent;
use crate::systems::{self, movement::clamp_direction};
use crate::world::SurvivorsState;
use sim_core::{Game, InputEnvelope, TerminalOutcome, Tick};
use survivors_types::{RunOutcome, RunSummary, SurvivorsObservation};

pub struct SurvivorsGame {
    state: SurvivorsState,
}

impl SurvivorsGame {
    pub fn state(&self) -> &SurvivorsState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SurvivorsState {
        &mut self.state
    }

    /// Results so far. A run that has not ended counts as abandoned.
    pub fn summary(&self) -> RunSummary {
        let state = &self.state;
        let outcome = match self.is_terminal() {
            Some(TerminalOutcome::Win) => RunOutcome::Survived,
            Some(TerminalOutcome::Lose) => RunOutcome::Defeated,
            None => RunOutcome::Abandoned,
        };
        RunSummary {
            starter: state.ace.starter.name().to_string(),
            outcome,
            elapsed_secs: state.elapsed_secs(),
            cycle: state.cycle.max(1),
            level: state.ace.level,
            kills: state.kills,
            coins_earned: state.coins_earned,
            stage: state.ace.stage,
        }
    }

    fn apply_input(&mut self, input: &SurvivorsInput, events: &mut Vec<SurvivorsEvent>) {
        let state = &mut self.state;
        match input {
            SurvivorsInput::Move { x, y } => {
                state.ace.move_dir = clamp_direction(*x, *y);
            }
            SurvivorsInput::ChooseUpgrade { index } => {
                if !state.paused {
                    systems::leveling::choose_upgrade(state, *index, events);
                }
            }
            SurvivorsInput::TogglePause => {
                state.paused = !state.paused;
                events.push(if state.paused {
                    SurvivorsEvent::Paused
                } else {
                    SurvivorsEvent::Resumed
                });
            }
        }
    }
}

impl Game for SurvivorsGame {
    type Config = SurvivorsConfig;
    type Input = SurvivorsInput;
    type Observation = SurvivorsObservation;
    type Event = SurvivorsEvent;

    fn new(config: Self::Config, seed: u64) -> Self {
        tracing::debug!(starter = config.starter.name(), seed, "new run");
        Self {
            state: SurvivorsState::new(config, seed),
        }
    }

    fn step(
        &mut self,
        _tick: Tick,
        inputs: &[InputEnvelope<Self::Input>],
        out_events: &mut Vec<Self::Event>,
    ) {
        if self.is_terminal().is_some() {
            return;
        }

        // 1. Inputs
        for input in inputs {
            self.apply_input(&input.payload, out_events);
        }

        // 2. Menus and pending level-up offers freeze the world
        if self.state.is_frozen() {
            return;
        }

        let state = &mut self.state;

        // 3. Cycle timer, boss arrivals, run completion
        systems::cycle::update_cycle(state, out_events);
        if state.completed {
            return;
        }

        // 4. Spawning
        systems::spawn::spawn_wave(state, out_events);

        // 5-7. Movement
        systems::movement::move_ace(state);
        systems::movement::move_enemies(state, out_events);
        systems::followers::move_companions(state);
        systems::followers::update_legion(state, out_events);

        // 8. Auto-attacks
        systems::combat::ace_attack(state, out_events);
        systems::combat::companion_attacks(state, out_events);

        // 9-11. Hits
        systems::combat::update_projectiles(state, out_events);
        systems::combat::legion_contact(state, out_events);
        systems::combat::enemy_contact(state, out_events);

        // 12-13. Kills and loot
        systems::pickups::remove_dead(state, out_events);
        systems::pickups::collect_pickups(state, out_events);

        // 14. Levels and evolution
        if !state.defeated {
            systems::leveling::update_leveling(state, out_events);
        }

        state.clock += 1;
    }

    fn observe(&self, tick: Tick) -> Self::Observation {
        crate::observe::build_observation(&self.state, tick)
    }

    fn is_terminal(&self) -> Option<TerminalOutcome> {
        if self.state.defeated {
            Some(TerminalOutcome::Lose)
        } else if self.state.completed {
            Some(TerminalOutcome::Win)
        } else {
            None
        }
    }

    fn is_paused(&self) -> bool {
        self.state.is_frozen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Starter;
    use sim_core::Micros;

    fn envelope(id: u64, tick: Tick, payload: SurvivorsInput) -> InputEnvelope<SurvivorsInput> {
        InputEnvelope {
            input_id: id,
            intended_tick: tick,
            payload,
        }
    }

    #[test]
    fn pause_toggle_freezes_the_clock() {
        let mut game = SurvivorsGame::new(SurvivorsConfig::default(), 1);
        let mut events = Vec::new();
        game.step(1, &[], &mut events);
        assert_eq!(game.state().clock, 1);

        game.step(2, &[envelope(1, 2, SurvivorsInput::TogglePause)], &mut events);
        assert!(game.is_paused());
        game.step(3, &[], &mut events);
        assert_eq!(game.state().clock, 1);

        game.step(4, &[envelope(2, 4, SurvivorsInput::TogglePause)], &mut events);
        assert!(!game.is_paused());
        assert_eq!(game.state().clock, 2);
        assert!(events.contains(&SurvivorsEvent::Paused));
        assert!(events.contains(&SurvivorsEvent::Resumed));
    }

    #[test]
    fn movement_input_moves_the_ace() {
        let mut game = SurvivorsGame::new(SurvivorsConfig::default(), 1);
        let mut events = Vec::new();
        game.step(1, &[envelope(1, 1, SurvivorsInput::Move { x: 0.0, y: 5.0 })], &mut events);
        let speed = Starter::Charmander.base_stats().move_speed;
        assert!((game.state().ace.pos.y - speed / 60.0).abs() < 1e-4);
    }

    #[test]
    fn survival_lands_inside_the_tick_limit() {
        let config = SurvivorsConfig {
            cycle_length: Micros::from_secs(1),
            cycles_total: 1,
            spawn_interval_base: Micros::from_secs(60),
            ..SurvivorsConfig::default()
        };
        let run_ticks = config.run_ticks();
        let limit = config.tick_limit();
        let mut game = SurvivorsGame::new(config, 1);
        let mut events = Vec::new();
        for tick in 1..=run_ticks {
            game.step(tick, &[], &mut events);
        }
        assert_eq!(game.is_terminal(), None);

        game.step(run_ticks + 1, &[], &mut events);
        assert_eq!(game.is_terminal(), Some(TerminalOutcome::Win));
        assert!(run_ticks + 1 <= limit);
    }

    #[test]
    fn surviving_every_cycle_wins() {
        let config = SurvivorsConfig {
            cycle_length: Micros::from_millis(100),
            cycles_total: 2,
            spawn_interval_base: Micros::from_secs(60),
            ..SurvivorsConfig::default()
        };
        let mut game = SurvivorsGame::new(config, 1);
        let mut events = Vec::new();
        for tick in 1..=20 {
            game.step(tick, &[], &mut events);
        }
        assert_eq!(game.is_terminal(), Some(TerminalOutcome::Win));
        assert_eq!(game.summary().outcome, RunOutcome::Survived);
        assert_eq!(game.summary().cycle, 2);
        assert_eq!(events.last(), Some(&SurvivorsEvent::RunCompleted));
    }

    #[test]
    fn observation_reflects_state() {
        let mut game = SurvivorsGame::new(SurvivorsConfig::default(), 1);
        let mut events = Vec::new();
        game.step(1, &[], &mut events);
        let obs = game.observe(1);
        assert_eq!(obs.cycle.cycle, 1);
        assert_eq!(obs.ace.species, "Charmander");
        assert_eq!(obs.enemies.len(), 2);
        assert!(obs.offer.is_none());
    }
}
