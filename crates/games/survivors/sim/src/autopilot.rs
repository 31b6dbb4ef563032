//! Deterministic controller for headless runs. It only reads observations,
//! so it drives the game exactly like a remote agent would.

use crate::actions::SurvivorsInput;
use crate::config::SurvivorsConfig;
use crate::events::SurvivorsEvent;
use crate::game::SurvivorsGame;
use glam::Vec2;
use sim_core::Tick;
use sim_host::RunHost;
use survivors_types::{Point, RunSummary, SurvivorsObservation};

/// Enemies closer than this push the Ace away.
const DANGER_RADIUS: f32 = 240.0;
/// Gems within this distance are worth walking to when nothing is close.
const GREED_RADIUS: f32 = 320.0;
/// Fraction of the arena half extent where the Ace starts steering inward.
const EDGE_MARGIN: f32 = 0.85;
/// Minimum direction change that produces a new `Move` input.
const STEER_EPSILON: f32 = 0.05;

/// Upgrade preference, most wanted first. Labels not listed rank last.
const UPGRADE_PRIORITY: &[&str] = &[
    "Multishot",
    "Damage",
    "Haste",
    "Vitality",
    "Recruit Eevee",
    "Recruit Growlithe",
    "Recruit Psyduck",
    "Recruit Oddish",
    "Legion Size",
    "Swiftness",
    "Companion Power",
    "Legion Power",
    "Magnet",
    "Recover",
];

fn vec(p: Point) -> Vec2 {
    Vec2::new(p.x, p.y)
}

#[derive(Clone, Debug)]
pub struct Autopilot {
    arena_half_extent: f32,
    last_dir: Vec2,
}

impl Autopilot {
    pub fn new(arena_half_extent: f32) -> Self {
        Self {
            arena_half_extent,
            last_dir: Vec2::ZERO,
        }
    }

    /// Autopilot that keeps to the arena of `config`.
    pub fn for_config(config: &SurvivorsConfig) -> Self {
        Self::new(config.arena_half_extent)
    }

    /// Inputs for the next tick. Usually empty: a new `Move` is only sent
    /// when the desired direction changes.
    pub fn decide(&mut self, obs: &SurvivorsObservation) -> Vec<SurvivorsInput> {
        if let Some(offer) = &obs.offer {
            return vec![SurvivorsInput::ChooseUpgrade {
                index: pick_upgrade(&offer.choices),
            }];
        }
        if obs.paused {
            return Vec::new();
        }

        let dir = self.steer(obs);
        if dir.distance(self.last_dir) < STEER_EPSILON {
            return Vec::new();
        }
        self.last_dir = dir;
        vec![SurvivorsInput::Move { x: dir.x, y: dir.y }]
    }

    fn steer(&self, obs: &SurvivorsObservation) -> Vec2 {
        let ace = vec(obs.ace.position);

        // Inverse-square weighted push away from nearby threats.
        let mut push = Vec2::ZERO;
        let threats = obs
            .enemies
            .iter()
            .map(|e| vec(e.position))
            .chain(obs.projectiles.iter().filter(|p| p.hostile).map(|p| vec(p.position)));
        for pos in threats {
            let away = ace - pos;
            let d2 = away.length_squared();
            if d2 < DANGER_RADIUS * DANGER_RADIUS && d2 > 1e-3 {
                push += away / d2;
            }
        }

        let mut dir = if push.length_squared() > 0.0 {
            push.normalize()
        } else {
            obs.pickups
                .iter()
                .filter(|p| p.kind == "Gem" || p.kind == "Berry" || p.kind == "Coin")
                .map(|p| vec(p.position) - ace)
                .filter(|d| d.length() < GREED_RADIUS)
                .min_by(|a, b| a.length_squared().total_cmp(&b.length_squared()))
                .map(|d| d.normalize_or_zero())
                .unwrap_or(Vec2::ZERO)
        };

        let edge = self.arena_half_extent * EDGE_MARGIN;
        if ace.x.abs() > edge || ace.y.abs() > edge {
            dir = (dir - ace.normalize_or_zero()).normalize_or_zero();
        }
        dir
    }
}

pub fn pick_upgrade(choices: &[String]) -> usize {
    let rank = |label: &String| {
        UPGRADE_PRIORITY
            .iter()
            .position(|p| *p == label.as_str())
            .unwrap_or(UPGRADE_PRIORITY.len())
    };
    choices
        .iter()
        .enumerate()
        .min_by_key(|(_, label)| rank(*label))
        .map(|(index, _)| index)
        .unwrap_or(0)
}

pub struct AutopilotRun {
    pub summary: RunSummary,
    pub final_tick: Tick,
    pub events: Vec<SurvivorsEvent>,
}

/// Play `host` with an [`Autopilot`] until the run ends or `max_ticks` host
/// ticks have passed. `on_event` sees every event as it happens.
pub fn run_with_autopilot(
    host: &mut RunHost<SurvivorsGame>,
    max_ticks: Tick,
    mut on_event: impl FnMut(Tick, &SurvivorsEvent),
) -> AutopilotRun {
    let mut pilot = Autopilot::for_config(&host.game().state().config);
    let mut events = Vec::new();

    while host.current_tick() < max_ticks {
        let obs = host.observe();
        for input in pilot.decide(&obs) {
            host.submit_now(input);
        }
        let Some(step_events) = host.step_one_tick() else {
            break;
        };
        let tick = host.current_tick();
        for event in &step_events {
            on_event(tick, event);
        }
        events.extend(step_events);
    }

    AutopilotRun {
        summary: host.game().summary(),
        final_tick: host.current_tick(),
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EnemyKind;
    use crate::systems::spawn::spawn_enemy;
    use sim_core::Game;

    #[test]
    fn prefers_listed_upgrades() {
        let choices = vec!["Magnet".to_string(), "Damage".to_string(), "Haste".to_string()];
        assert_eq!(pick_upgrade(&choices), 1);
        assert_eq!(pick_upgrade(&["Mystery".to_string()]), 0);
    }

    #[test]
    fn flees_from_enemies() {
        let mut game = SurvivorsGame::new(SurvivorsConfig::default(), 3);
        let state = game.state_mut();
        state.cycle = 1;
        let id = spawn_enemy(state, EnemyKind::Rattata);
        state.world.enemies[id].pos = Vec2::new(100.0, 0.0);

        let mut pilot = Autopilot::new(2000.0);
        let inputs = pilot.decide(&game.observe(0));
        match inputs.as_slice() {
            [SurvivorsInput::Move { x, .. }] => assert!(*x < -0.9),
            other => panic!("unexpected inputs {:?}", other),
        }
        assert!(pilot.decide(&game.observe(0)).is_empty());
    }

    #[test]
    fn steers_back_from_the_edge() {
        let mut game = SurvivorsGame::new(SurvivorsConfig::default(), 3);
        game.state_mut().ace.pos = Vec2::new(1950.0, 0.0);
        let mut pilot = Autopilot::new(2000.0);
        let inputs = pilot.decide(&game.observe(0));
        match inputs.as_slice() {
            [SurvivorsInput::Move { x, .. }] => assert!(*x < 0.0),
            other => panic!("unexpected inputs {:?}", other),
        }
    }

    #[test]
    fn keeps_to_a_small_arena() {
        let config = SurvivorsConfig {
            arena_half_extent: 500.0,
            ..SurvivorsConfig::default()
        };
        let mut game = SurvivorsGame::new(config.clone(), 3);
        game.state_mut().ace.pos = Vec2::new(0.0, 460.0);

        let mut pilot = Autopilot::for_config(&config);
        match pilot.decide(&game.observe(0)).as_slice() {
            [SurvivorsInput::Move { y, .. }] => assert!(*y < 0.0),
            other => panic!("unexpected inputs {:?}", other),
        }
        assert!(Autopilot::new(2000.0).decide(&game.observe(0)).is_empty());
    }
}
