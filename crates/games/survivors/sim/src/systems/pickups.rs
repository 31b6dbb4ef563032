use crate::events::SurvivorsEvent;
use crate::world::{EnemyId, Pickup, PickupId, PickupKind, SurvivorsState};
use glam::Vec2;
use rand::Rng;

/// Extra reach added to the Ace radius when collecting.
const COLLECT_SLACK: f32 = 8.0;

/// Remove enemies at or below zero hp and drop their loot.
pub fn remove_dead(state: &mut SurvivorsState, events: &mut Vec<SurvivorsEvent>) {
    let dead: Vec<EnemyId> = state
        .world
        .enemies
        .iter()
        .filter(|(_, e)| e.hp <= 0.0)
        .map(|(id, _)| id)
        .collect();

    for id in dead {
        let Some(enemy) = state.world.enemies.remove(id) else {
            continue;
        };
        let stats = enemy.kind.stats();
        state.kills += 1;
        events.push(SurvivorsEvent::EnemyKilled {
            id,
            kind: enemy.kind,
            x: enemy.pos.x,
            y: enemy.pos.y,
            by: enemy.last_hit_by,
        });

        drop_gem(state, enemy.pos, stats.xp);

        if stats.boss {
            events.push(SurvivorsEvent::BossDefeated { kind: enemy.kind });
            tracing::info!(boss = enemy.kind.name(), cycle = state.cycle, "boss defeated");
            state.world.pickups.insert(Pickup {
                kind: PickupKind::Coin,
                pos: enemy.pos + Vec2::new(enemy.radius, 0.0),
                value: state.config.boss_coin_drop,
            });
            continue;
        }

        let berry_roll: f32 = state.rng.gen();
        if berry_roll < state.config.berry_drop_chance {
            state.world.pickups.insert(Pickup {
                kind: PickupKind::Berry,
                pos: enemy.pos + Vec2::new(0.0, enemy.radius),
                value: state.config.berry_heal as u32,
            });
        }
        let coin_roll: f32 = state.rng.gen();
        if coin_roll < state.config.coin_drop_chance {
            state.world.pickups.insert(Pickup {
                kind: PickupKind::Coin,
                pos: enemy.pos - Vec2::new(0.0, enemy.radius),
                value: 1,
            });
        }
    }
}

/// Place a gem, or fold its xp into the nearest gem once the field holds
/// `max_gems`.
fn drop_gem(state: &mut SurvivorsState, pos: Vec2, value: u32) {
    let mut count = 0;
    let mut nearest: Option<(PickupId, f32)> = None;
    for (id, gem) in state.world.pickups.iter().filter(|(_, p)| p.kind == PickupKind::Gem) {
        count += 1;
        let d2 = gem.pos.distance_squared(pos);
        if nearest.map_or(true, |(_, best)| d2 < best) {
            nearest = Some((id, d2));
        }
    }

    if count >= state.config.max_gems {
        if let Some((id, _)) = nearest {
            state.world.pickups[id].value += value;
            return;
        }
    }
    state.world.pickups.insert(Pickup {
        kind: PickupKind::Gem,
        pos,
        value,
    });
}

/// Pull pickups inside the magnet radius towards the Ace and collect the
/// ones it touches.
pub fn collect_pickups(state: &mut SurvivorsState, events: &mut Vec<SurvivorsEvent>) {
    let ace_pos = state.ace.pos;
    let collect_radius = state.ace_radius() + COLLECT_SLACK;
    let magnet = state.magnet_radius();
    let pull = state.config.gem_pull_speed * state.config.dt();

    let mut collected: Vec<PickupId> = Vec::new();
    for (id, pickup) in state.world.pickups.iter_mut() {
        let offset = ace_pos - pickup.pos;
        let distance = offset.length();
        if distance <= magnet && distance > collect_radius {
            pickup.pos += offset / distance * pull.min(distance);
        }
        if pickup.pos.distance(ace_pos) <= collect_radius {
            collected.push(id);
        }
    }

    for id in collected {
        let Some(pickup) = state.world.pickups.remove(id) else {
            continue;
        };
        match pickup.kind {
            PickupKind::Gem => {
                state.ace.xp += pickup.value;
                events.push(SurvivorsEvent::GemCollected { xp: pickup.value });
            }
            PickupKind::Berry => {
                let max_hp = state.ace_max_hp();
                let healed = (pickup.value as f32).min(max_hp - state.ace.hp).max(0.0);
                state.ace.hp += healed;
                events.push(SurvivorsEvent::AceHealed {
                    amount: healed,
                    hp: state.ace.hp,
                });
            }
            PickupKind::Coin => {
                state.coins_earned += pickup.value;
                events.push(SurvivorsEvent::CoinCollected {
                    coins: pickup.value,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurvivorsConfig;
    use crate::data::EnemyKind;
    use crate::systems::spawn::spawn_enemy;

    fn state() -> SurvivorsState {
        let mut state = SurvivorsState::new(SurvivorsConfig::default(), 9);
        state.cycle = 1;
        state
    }

    fn place_pickup(state: &mut SurvivorsState, kind: PickupKind, pos: Vec2, value: u32) -> PickupId {
        state.world.pickups.insert(Pickup { kind, pos, value })
    }

    #[test]
    fn dead_enemies_drop_gems() {
        let mut s = state();
        s.config.berry_drop_chance = 0.0;
        s.config.coin_drop_chance = 0.0;
        let id = spawn_enemy(&mut s, EnemyKind::Geodude);
        s.world.enemies[id].hp = 0.0;
        let mut events = Vec::new();
        remove_dead(&mut s, &mut events);

        assert!(s.world.enemies.is_empty());
        assert_eq!(s.kills, 1);
        let gems: Vec<u32> = s.world.pickups.values().map(|p| p.value).collect();
        assert_eq!(gems, vec![4]);
        assert!(matches!(events[0], SurvivorsEvent::EnemyKilled { kind: EnemyKind::Geodude, .. }));
    }

    #[test]
    fn gems_past_the_cap_merge_into_the_nearest() {
        let mut s = state();
        s.config.max_gems = 2;
        s.config.berry_drop_chance = 0.0;
        s.config.coin_drop_chance = 0.0;
        let near = place_pickup(&mut s, PickupKind::Gem, Vec2::new(300.0, 0.0), 1);
        let far = place_pickup(&mut s, PickupKind::Gem, Vec2::new(-300.0, 0.0), 1);
        place_pickup(&mut s, PickupKind::Coin, Vec2::new(250.0, 0.0), 1);

        let id = spawn_enemy(&mut s, EnemyKind::Geodude);
        s.world.enemies[id].pos = Vec2::new(250.0, 10.0);
        s.world.enemies[id].hp = 0.0;
        let mut events = Vec::new();
        remove_dead(&mut s, &mut events);

        let gems = s.world.pickups.values().filter(|p| p.kind == PickupKind::Gem).count();
        assert_eq!(gems, 2);
        assert_eq!(s.world.pickups[near].value, 5);
        assert_eq!(s.world.pickups[far].value, 1);
        assert_eq!(s.world.pickups[near].pos, Vec2::new(300.0, 0.0));
    }

    #[test]
    fn bosses_drop_coins() {
        let mut s = state();
        let id = spawn_enemy(&mut s, EnemyKind::Onix);
        s.world.enemies[id].hp = -5.0;
        let mut events = Vec::new();
        remove_dead(&mut s, &mut events);
        assert!(events.contains(&SurvivorsEvent::BossDefeated { kind: EnemyKind::Onix }));
        let coins: u32 = s
            .world
            .pickups
            .values()
            .filter(|p| p.kind == PickupKind::Coin)
            .map(|p| p.value)
            .sum();
        assert_eq!(coins, 25);
    }

    #[test]
    fn magnet_pulls_then_collects() {
        let mut s = state();
        let id = place_pickup(&mut s, PickupKind::Gem, Vec2::new(50.0, 0.0), 3);
        let mut events = Vec::new();
        collect_pickups(&mut s, &mut events);
        assert!(s.world.pickups[id].pos.x < 50.0);

        for _ in 0..30 {
            collect_pickups(&mut s, &mut events);
        }
        assert!(s.world.pickups.is_empty());
        assert_eq!(s.ace.xp, 3);
        assert_eq!(events, vec![SurvivorsEvent::GemCollected { xp: 3 }]);
    }

    #[test]
    fn distant_pickups_stay_put() {
        let mut s = state();
        let id = place_pickup(&mut s, PickupKind::Gem, Vec2::new(500.0, 0.0), 1);
        let mut events = Vec::new();
        collect_pickups(&mut s, &mut events);
        assert_eq!(s.world.pickups[id].pos, Vec2::new(500.0, 0.0));
    }

    #[test]
    fn berries_heal_up_to_max() {
        let mut s = state();
        s.ace.hp = s.ace_max_hp() - 5.0;
        place_pickup(&mut s, PickupKind::Berry, Vec2::ZERO, 20);
        place_pickup(&mut s, PickupKind::Coin, Vec2::ZERO, 2);
        let mut events = Vec::new();
        collect_pickups(&mut s, &mut events);
        assert_eq!(s.ace.hp, s.ace_max_hp());
        assert_eq!(s.coins_earned, 2);
        assert!(events.contains(&SurvivorsEvent::AceHealed {
            amount: 5.0,
            hp: s.ace_max_hp()
        }));
    }
}
