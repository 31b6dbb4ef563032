//! Per-tick systems, run in order by `SurvivorsGame::step`.

pub mod combat;
pub mod cycle;
pub mod followers;
pub mod leveling;
pub mod movement;
pub mod pickups;
pub mod spawn;

use crate::world::{Enemy, EnemyId};
use glam::Vec2;
use slotmap::SlotMap;

/// Nearest enemy within `range` of `from`; ties go to the weaker enemy.
pub fn find_nearest_enemy(
    enemies: &SlotMap<EnemyId, Enemy>,
    from: Vec2,
    range: f32,
) -> Option<EnemyId> {
    let range_sq = range * range;
    let mut best: Option<(EnemyId, f32, f32)> = None;

    for (id, enemy) in enemies.iter() {
        if enemy.hp <= 0.0 {
            continue;
        }
        let dist_sq = enemy.pos.distance_squared(from);
        if dist_sq > range_sq {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, best_dist, best_hp)) => {
                dist_sq < best_dist || (dist_sq == best_dist && enemy.hp < best_hp)
            }
        };
        if better {
            best = Some((id, dist_sq, enemy.hp));
        }
    }

    best.map(|(id, _, _)| id)
}

#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) <= r * r
}
