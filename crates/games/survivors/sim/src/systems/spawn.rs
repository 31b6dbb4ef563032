use crate::data::{EnemyKind, Behavior};
use crate::events::SurvivorsEvent;
use crate::world::{Enemy, EnemyBrain, EnemyId, SurvivorsState};
use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use std::f32::consts::TAU;

/// Spawn a batch on the ring around the Ace whenever the spawn timer is due.
pub fn spawn_wave(state: &mut SurvivorsState, events: &mut Vec<SurvivorsEvent>) {
    if state.cycle == 0 || state.clock < state.next_spawn {
        return;
    }

    let interval = state.config.spawn_interval(state.cycle);
    state.next_spawn = state.clock + state.config.duration_to_ticks(interval).max(1);

    let pool = EnemyKind::spawn_pool(state.cycle);
    if pool.is_empty() {
        return;
    }

    let room = state
        .config
        .max_enemies
        .saturating_sub(state.world.enemies.len());
    let batch = (state.config.spawn_batch(state.cycle) as usize).min(room);

    for _ in 0..batch {
        let kind = match pool.choose_weighted(&mut state.rng, |k| k.stats().weight) {
            Ok(kind) => *kind,
            Err(_) => break,
        };
        let id = spawn_enemy(state, kind);
        events.push(SurvivorsEvent::EnemySpawned { id, kind });
    }
}

/// Insert one enemy of `kind` on the spawn ring, scaled for the current cycle.
pub fn spawn_enemy(state: &mut SurvivorsState, kind: EnemyKind) -> EnemyId {
    let stats = kind.stats();
    let config = &state.config;

    let angle = state.rng.gen_range(0.0, TAU);
    let distance = if config.spawn_ring_max > config.spawn_ring_min {
        state.rng.gen_range(config.spawn_ring_min, config.spawn_ring_max)
    } else {
        config.spawn_ring_min
    };
    let extent = config.arena_half_extent;
    let pos = (state.ace.pos + Vec2::from_angle(angle) * distance)
        .clamp(Vec2::splat(-extent), Vec2::splat(extent));

    let hp = stats.max_hp * config.hp_scale(state.cycle);
    let damage = stats.damage * config.damage_scale(state.cycle);

    let first_action = match stats.behavior {
        Behavior::Dash => config.duration_to_ticks(config.dash_period),
        Behavior::Ranged => config.duration_to_ticks(config.ranged_fire_period),
        Behavior::Boss => config.duration_to_ticks(config.boss_volley_period),
        Behavior::Chase | Behavior::Swarm | Behavior::Tank => 0,
    };

    let brain = EnemyBrain {
        phase: state.rng.gen_range(0.0, TAU),
        next_action: state.clock + first_action,
        dash_until: 0,
        dash_dir: Vec2::ZERO,
    };

    state.world.enemies.insert(Enemy {
        kind,
        pos,
        hp,
        max_hp: hp,
        damage,
        speed: stats.speed,
        radius: stats.radius,
        brain,
        last_hit_by: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurvivorsConfig;

    fn running_state() -> SurvivorsState {
        let mut state = SurvivorsState::new(SurvivorsConfig::default(), 3);
        state.cycle = 1;
        state
    }

    #[test]
    fn batch_spawns_on_the_ring() {
        let mut state = running_state();
        let mut events = Vec::new();
        spawn_wave(&mut state, &mut events);

        assert_eq!(state.world.enemies.len(), 2);
        assert_eq!(events.len(), 2);
        for enemy in state.world.enemies.values() {
            let d = enemy.pos.distance(state.ace.pos);
            assert!((420.0..=620.0).contains(&d), "spawned at distance {}", d);
            assert!(matches!(enemy.kind, EnemyKind::Rattata | EnemyKind::Zubat));
        }
        assert_eq!(state.next_spawn, 72);
    }

    #[test]
    fn waits_for_the_interval() {
        let mut state = running_state();
        let mut events = Vec::new();
        spawn_wave(&mut state, &mut events);
        state.clock = 71;
        spawn_wave(&mut state, &mut events);
        assert_eq!(state.world.enemies.len(), 2);
        state.clock = 72;
        spawn_wave(&mut state, &mut events);
        assert_eq!(state.world.enemies.len(), 4);
    }

    #[test]
    fn respects_enemy_cap() {
        let mut state = running_state();
        state.config.max_enemies = 3;
        let mut events = Vec::new();
        for tick in 0..10 {
            state.clock = tick * 100;
            spawn_wave(&mut state, &mut events);
        }
        assert_eq!(state.world.enemies.len(), 3);
    }

    #[test]
    fn later_cycles_scale_hp() {
        let mut state = running_state();
        state.cycle = 5;
        let id = spawn_enemy(&mut state, EnemyKind::Rattata);
        let enemy = &state.world.enemies[id];
        assert!((enemy.max_hp - 16.0).abs() < 1e-4);
    }
}
