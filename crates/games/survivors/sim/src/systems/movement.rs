use crate::data::Behavior;
use crate::events::{AttackSource, SurvivorsEvent};
use crate::systems::combat::spawn_hostile_projectile;
use crate::world::{EnemyId, SurvivorsState};
use glam::Vec2;

/// Clamp a requested direction to unit length. Non-finite input stops the Ace.
pub fn clamp_direction(x: f32, y: f32) -> Vec2 {
    let dir = Vec2::new(x, y);
    if !dir.is_finite() {
        return Vec2::ZERO;
    }
    if dir.length_squared() > 1.0 {
        dir.normalize()
    } else {
        dir
    }
}

pub fn move_ace(state: &mut SurvivorsState) {
    let dir = state.ace.move_dir;
    if dir == Vec2::ZERO {
        return;
    }
    let speed = state.ace_stats().move_speed;
    let extent = state.config.arena_half_extent;
    let next = state.ace.pos + dir * speed * state.config.dt();
    state.ace.pos = next.clamp(Vec2::splat(-extent), Vec2::splat(extent));
    state.ace.facing = dir.normalize_or_zero();
}

/// Move every enemy according to its behavior. Ranged enemies and bosses
/// fire hostile projectiles from here.
pub fn move_enemies(state: &mut SurvivorsState, events: &mut Vec<SurvivorsEvent>) {
    let ids: Vec<EnemyId> = state.world.enemies.keys().collect();
    let dt = state.config.dt();
    let clock = state.clock;
    let target = state.ace.pos;

    for id in ids {
        let Some(enemy) = state.world.enemies.get_mut(id) else {
            continue;
        };
        let behavior = enemy.kind.stats().behavior;
        let offset = target - enemy.pos;
        let distance = offset.length();
        let toward = offset.normalize_or_zero();

        let mut shots: Vec<Vec2> = Vec::new();
        let velocity = match behavior {
            Behavior::Chase | Behavior::Tank => toward * enemy.speed,
            Behavior::Swarm => {
                let weave = (clock as f32 * dt * 4.0 + enemy.brain.phase).sin() * 0.9;
                Vec2::from_angle(weave).rotate(toward) * enemy.speed
            }
            Behavior::Dash => {
                if clock < enemy.brain.dash_until {
                    enemy.brain.dash_dir * enemy.speed * state.config.dash_speed_multiplier
                } else if clock >= enemy.brain.next_action {
                    enemy.brain.dash_dir = toward;
                    enemy.brain.dash_until =
                        clock + state.config.duration_to_ticks(state.config.dash_duration);
                    enemy.brain.next_action =
                        clock + state.config.duration_to_ticks(state.config.dash_period);
                    toward * enemy.speed * state.config.dash_speed_multiplier
                } else {
                    toward * enemy.speed
                }
            }
            Behavior::Ranged => {
                let preferred = state.config.ranged_preferred_distance;
                if clock >= enemy.brain.next_action && distance <= preferred * 1.6 {
                    enemy.brain.next_action =
                        clock + state.config.duration_to_ticks(state.config.ranged_fire_period);
                    shots.push(toward);
                }
                if distance > preferred + 20.0 {
                    toward * enemy.speed
                } else if distance < preferred - 20.0 {
                    -toward * enemy.speed
                } else {
                    toward.perp() * enemy.speed * 0.5
                }
            }
            Behavior::Boss => {
                if clock >= enemy.brain.next_action {
                    enemy.brain.next_action =
                        clock + state.config.duration_to_ticks(state.config.boss_volley_period);
                    let count = state.config.boss_volley_count.max(1);
                    let step = std::f32::consts::TAU / count as f32;
                    let start = enemy.brain.phase;
                    shots.extend((0..count).map(|i| Vec2::from_angle(start + step * i as f32)));
                }
                toward * enemy.speed
            }
        };

        enemy.pos += velocity * dt;
        let origin = enemy.pos;
        let damage = enemy.damage * 0.75;
        let kind = enemy.kind;

        if !shots.is_empty() {
            let attack = if behavior == Behavior::Boss {
                crate::data::AttackType::Spread
            } else {
                crate::data::AttackType::Bolt
            };
            events.push(SurvivorsEvent::AttackFired {
                source: AttackSource::Enemy(kind),
                attack,
            });
        }
        for dir in shots {
            spawn_hostile_projectile(state, origin, dir, damage, kind);
        }
    }
}
