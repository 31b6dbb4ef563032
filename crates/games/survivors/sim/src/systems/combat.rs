use crate::data::{AttackType, EnemyKind, StatBlock, LEGION};
use crate::events::{AttackSource, SurvivorsEvent};
use crate::systems::{circles_overlap, find_nearest_enemy};
use crate::world::{CompanionId, EnemyId, Projectile, ProjectileId, SurvivorsState};
use glam::Vec2;

const HOSTILE_PROJECTILE_RADIUS: f32 = 6.0;
const HOSTILE_PROJECTILE_LIFETIME_SECS: f32 = 4.0;
const SPREAD_FAN_DEGREES: f32 = 15.0;
const VOLLEY_FAN_DEGREES: f32 = 6.0;
/// Half-angle of the melee arc.
const MELEE_ARC_DEGREES: f32 = 60.0;

pub fn spawn_hostile_projectile(
    state: &mut SurvivorsState,
    origin: Vec2,
    dir: Vec2,
    damage: f32,
    kind: EnemyKind,
) -> ProjectileId {
    let lifetime = (HOSTILE_PROJECTILE_LIFETIME_SECS * state.config.tick_hz as f32) as u64;
    state.world.projectiles.insert(Projectile {
        pos: origin,
        vel: dir * state.config.hostile_projectile_speed,
        radius: HOSTILE_PROJECTILE_RADIUS,
        damage,
        pierce_left: 0,
        expires_at: state.clock + lifetime,
        hostile: true,
        source: AttackSource::Enemy(kind),
        hit: Vec::new(),
    })
}

/// Apply damage to the Ace unless it is inside its invulnerability window.
/// Returns whether the hit landed.
pub fn damage_ace(
    state: &mut SurvivorsState,
    amount: f32,
    by: AttackSource,
    events: &mut Vec<SurvivorsEvent>,
) -> bool {
    if state.defeated || state.clock < state.ace.invulnerable_until {
        return false;
    }
    state.ace.hp = (state.ace.hp - amount).max(0.0);
    state.ace.invulnerable_until =
        state.clock + state.config.duration_to_ticks(state.config.invulnerability);
    events.push(SurvivorsEvent::AceDamaged {
        amount,
        hp: state.ace.hp,
        by,
    });

    if state.ace.hp <= 0.0 {
        state.defeated = true;
        events.push(SurvivorsEvent::AceDefeated);
        tracing::info!(
            cycle = state.cycle,
            level = state.ace.level,
            kills = state.kills,
            "ace defeated"
        );
    }
    true
}

fn damage_enemy(state: &mut SurvivorsState, id: EnemyId, amount: f32, source: AttackSource) {
    if let Some(enemy) = state.world.enemies.get_mut(id) {
        enemy.hp -= amount;
        enemy.last_hit_by = Some(source);
    }
}

/// Fire one attack from `origin` if a target is in reach. Returns the aim
/// direction when it fired; cooldowns are only consumed by attacks that fire.
///
/// Melee swings around `facing` when given, otherwise toward the target.
fn fire_attack(
    state: &mut SurvivorsState,
    source: AttackSource,
    attack: AttackType,
    origin: Vec2,
    stats: &StatBlock,
    facing: Option<Vec2>,
    events: &mut Vec<SurvivorsEvent>,
) -> Option<Vec2> {
    let reach = match attack {
        AttackType::Bolt | AttackType::Spread | AttackType::Pierce => stats.range,
        AttackType::Aura | AttackType::Melee => stats.area,
    };
    let target = find_nearest_enemy(&state.world.enemies, origin, reach)?;
    let target_pos = state.world.enemies[target].pos;
    let aim = (target_pos - origin).normalize_or(Vec2::X);

    match attack {
        AttackType::Bolt | AttackType::Spread | AttackType::Pierce => {
            let count = stats.projectiles.max(1) as usize;
            let fan = if attack == AttackType::Spread {
                SPREAD_FAN_DEGREES
            } else {
                VOLLEY_FAN_DEGREES
            };
            let lifetime_secs = stats.range / stats.projectile_speed.max(1.0) * 1.5;
            let lifetime = (lifetime_secs * state.config.tick_hz as f32).ceil() as u64;
            let pierce = if attack == AttackType::Pierce {
                stats.pierce.max(1)
            } else {
                stats.pierce
            };

            for i in 0..count {
                let offset = (i as f32 - (count - 1) as f32 / 2.0) * fan.to_radians();
                let dir = Vec2::from_angle(offset).rotate(aim);
                state.world.projectiles.insert(Projectile {
                    pos: origin,
                    vel: dir * stats.projectile_speed,
                    radius: stats.area,
                    damage: stats.damage,
                    pierce_left: pierce,
                    expires_at: state.clock + lifetime.max(1),
                    hostile: false,
                    source,
                    hit: Vec::new(),
                });
            }
        }
        AttackType::Aura => {
            let hits: Vec<EnemyId> = state
                .world
                .enemies
                .iter()
                .filter(|(_, e)| circles_overlap(origin, stats.area, e.pos, e.radius))
                .map(|(id, _)| id)
                .collect();
            for id in hits {
                damage_enemy(state, id, stats.damage, source);
            }
        }
        AttackType::Melee => {
            let swing = facing.unwrap_or(aim);
            let cos_arc = MELEE_ARC_DEGREES.to_radians().cos();
            let hits: Vec<EnemyId> = state
                .world
                .enemies
                .iter()
                .filter(|(_, e)| {
                    let offset = e.pos - origin;
                    let reach = stats.area + e.radius;
                    if offset.length_squared() > reach * reach {
                        return false;
                    }
                    let dir = offset.normalize_or_zero();
                    dir == Vec2::ZERO || dir.dot(swing) >= cos_arc
                })
                .map(|(id, _)| id)
                .collect();
            for id in hits {
                damage_enemy(state, id, stats.damage, source);
            }
        }
    }

    events.push(SurvivorsEvent::AttackFired { source, attack });
    Some(aim)
}

pub fn ace_attack(state: &mut SurvivorsState, events: &mut Vec<SurvivorsEvent>) {
    if state.clock < state.ace.next_attack {
        return;
    }
    let stats = state.ace_stats();
    let attack = state.ace.attack();
    let origin = state.ace.pos;
    // A moving Ace swings where it walks; a standing one turns to the target.
    let moving = state.ace.move_dir != Vec2::ZERO;
    let facing = moving.then_some(state.ace.facing);
    let Some(aim) = fire_attack(state, AttackSource::Ace, attack, origin, &stats, facing, events)
    else {
        return;
    };
    state.ace.next_attack = state.clock + state.config.duration_to_ticks(stats.cooldown).max(1);
    if !moving {
        state.ace.facing = aim;
    }
}

pub fn companion_attacks(state: &mut SurvivorsState, events: &mut Vec<SurvivorsEvent>) {
    let ids: Vec<CompanionId> = state.world.companions.keys().collect();
    for id in ids {
        let Some(companion) = state.world.companions.get(id) else {
            continue;
        };
        if state.clock < companion.next_attack {
            continue;
        }
        let kind = companion.kind;
        let origin = companion.pos;
        let stats = state.companion_stats(kind);
        let fired = fire_attack(
            state,
            AttackSource::Companion(kind),
            kind.attack(),
            origin,
            &stats,
            None,
            events,
        );
        if fired.is_some() {
            let ready = state.clock + state.config.duration_to_ticks(stats.cooldown).max(1);
            if let Some(companion) = state.world.companions.get_mut(id) {
                companion.next_attack = ready;
            }
        }
    }
}

/// Move projectiles, expire old ones and resolve hits.
pub fn update_projectiles(state: &mut SurvivorsState, events: &mut Vec<SurvivorsEvent>) {
    let dt = state.config.dt();
    let extent = state.config.arena_half_extent + 200.0;
    let ids: Vec<ProjectileId> = state.world.projectiles.keys().collect();

    for pid in ids {
        let Some(projectile) = state.world.projectiles.get_mut(pid) else {
            continue;
        };
        projectile.pos += projectile.vel * dt;
        let out_of_bounds = projectile.pos.x.abs() > extent || projectile.pos.y.abs() > extent;
        if state.clock >= projectile.expires_at || out_of_bounds {
            state.world.projectiles.remove(pid);
            continue;
        }

        let (pos, radius, damage, source, hostile) = (
            projectile.pos,
            projectile.radius,
            projectile.damage,
            projectile.source,
            projectile.hostile,
        );

        if hostile {
            resolve_hostile_hit(state, pid, pos, radius, damage, source, events);
        } else {
            resolve_friendly_hits(state, pid, pos, radius, damage, source);
        }
    }
}

fn resolve_friendly_hits(
    state: &mut SurvivorsState,
    pid: ProjectileId,
    pos: Vec2,
    radius: f32,
    damage: f32,
    source: AttackSource,
) {
    loop {
        let Some(projectile) = state.world.projectiles.get(pid) else {
            return;
        };
        let next_hit = state
            .world
            .enemies
            .iter()
            .filter(|(id, e)| e.hp > 0.0 && !projectile.hit.contains(id))
            .find(|(_, e)| circles_overlap(pos, radius, e.pos, e.radius))
            .map(|(id, _)| id);
        let Some(enemy_id) = next_hit else {
            return;
        };

        damage_enemy(state, enemy_id, damage, source);

        let Some(projectile) = state.world.projectiles.get_mut(pid) else {
            return;
        };
        if projectile.pierce_left == 0 {
            state.world.projectiles.remove(pid);
            return;
        }
        projectile.pierce_left -= 1;
        projectile.hit.push(enemy_id);
    }
}

fn resolve_hostile_hit(
    state: &mut SurvivorsState,
    pid: ProjectileId,
    pos: Vec2,
    radius: f32,
    damage: f32,
    source: AttackSource,
    events: &mut Vec<SurvivorsEvent>,
) {
    let ace_radius = state.ace_radius();
    if circles_overlap(pos, radius, state.ace.pos, ace_radius) {
        // Shots are absorbed even while the Ace is invulnerable.
        damage_ace(state, damage, source, events);
        state.world.projectiles.remove(pid);
        return;
    }

    let unit = state
        .world
        .legion
        .iter()
        .position(|u| u.is_active() && circles_overlap(pos, radius, u.pos, LEGION.radius));
    if let Some(index) = unit {
        hurt_legion_unit(state, index, damage, events);
        state.world.projectiles.remove(pid);
    }
}

fn hurt_legion_unit(
    state: &mut SurvivorsState,
    index: usize,
    amount: f32,
    events: &mut Vec<SurvivorsEvent>,
) {
    let respawn = state.clock + state.config.duration_to_ticks(LEGION.respawn);
    let Some(unit) = state.world.legion.get_mut(index) else {
        return;
    };
    unit.hp -= amount;
    if unit.hp <= 0.0 {
        unit.hp = 0.0;
        unit.respawn_at = Some(respawn);
        unit.hit_cooldowns.clear();
        events.push(SurvivorsEvent::LegionUnitLost { index });
    }
}

/// Legion units damage enemies they touch and take the enemy's contact
/// damage in return, both gated by a per-enemy hit cooldown.
pub fn legion_contact(state: &mut SurvivorsState, events: &mut Vec<SurvivorsEvent>) {
    let clock = state.clock;
    let cooldown = state.config.duration_to_ticks(LEGION.hit_cooldown);
    let damage = state.legion_damage();

    for index in 0..state.world.legion.len() {
        let unit = &mut state.world.legion[index];
        if !unit.is_active() {
            continue;
        }
        unit.hit_cooldowns.retain(|&(_, until)| until > clock);

        let unit_pos = unit.pos;
        let touching: Vec<(EnemyId, f32)> = state
            .world
            .enemies
            .iter()
            .filter(|(_, e)| e.hp > 0.0 && circles_overlap(unit_pos, LEGION.radius, e.pos, e.radius))
            .map(|(id, e)| (id, e.damage))
            .collect();

        for (enemy_id, enemy_damage) in touching {
            let unit = &mut state.world.legion[index];
            if !unit.is_active() || unit.hit_cooldowns.iter().any(|&(id, _)| id == enemy_id) {
                continue;
            }
            unit.hit_cooldowns.push((enemy_id, clock + cooldown));
            damage_enemy(state, enemy_id, damage, AttackSource::Legion);
            hurt_legion_unit(state, index, enemy_damage * 0.5, events);
        }
    }
}

/// Enemies touching the Ace deal contact damage.
pub fn enemy_contact(state: &mut SurvivorsState, events: &mut Vec<SurvivorsEvent>) {
    let ace_pos = state.ace.pos;
    let ace_radius = state.ace_radius();
    let hits: Vec<(f32, EnemyKind)> = state
        .world
        .enemies
        .values()
        .filter(|e| e.hp > 0.0 && circles_overlap(ace_pos, ace_radius, e.pos, e.radius))
        .map(|e| (e.damage, e.kind))
        .collect();

    for (damage, kind) in hits {
        if !damage_ace(state, damage, AttackSource::Enemy(kind), events) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurvivorsConfig;
    use crate::data::{CompanionKind, Starter};
    use crate::systems::spawn::spawn_enemy;
    use crate::upgrades::{apply_upgrade, Upgrade};

    fn state(starter: Starter) -> SurvivorsState {
        let config = SurvivorsConfig {
            starter,
            ..SurvivorsConfig::default()
        };
        let mut state = SurvivorsState::new(config, 5);
        state.cycle = 1;
        state
    }

    fn place(state: &mut SurvivorsState, kind: EnemyKind, pos: Vec2) -> EnemyId {
        let id = spawn_enemy(state, kind);
        state.world.enemies[id].pos = pos;
        id
    }

    #[test]
    fn no_target_means_no_cooldown() {
        let mut s = state(Starter::Charmander);
        let mut events = Vec::new();
        ace_attack(&mut s, &mut events);
        assert!(events.is_empty());
        assert_eq!(s.ace.next_attack, 0);
    }

    #[test]
    fn bolt_fires_at_the_nearest_enemy() {
        let mut s = state(Starter::Pichu);
        place(&mut s, EnemyKind::Rattata, Vec2::new(100.0, 0.0));
        place(&mut s, EnemyKind::Rattata, Vec2::new(0.0, 200.0));
        let mut events = Vec::new();
        ace_attack(&mut s, &mut events);

        assert_eq!(s.world.projectiles.len(), 1);
        let shot = s.world.projectiles.values().next().map(|p| p.vel.normalize());
        let dir = shot.unwrap_or(Vec2::ZERO);
        assert!(dir.x > 0.99);
        assert!(s.ace.next_attack > 0);
        assert_eq!(
            events,
            vec![SurvivorsEvent::AttackFired {
                source: AttackSource::Ace,
                attack: AttackType::Bolt
            }]
        );
    }

    #[test]
    fn spread_fans_projectiles() {
        let mut s = state(Starter::Charmander);
        place(&mut s, EnemyKind::Rattata, Vec2::new(100.0, 0.0));
        let mut events = Vec::new();
        ace_attack(&mut s, &mut events);
        let count = Starter::Charmander.base_stats().projectiles as usize;
        assert_eq!(s.world.projectiles.len(), count);

        let mut angles: Vec<f32> = s
            .world
            .projectiles
            .values()
            .map(|p| p.vel.y.atan2(p.vel.x).to_degrees())
            .collect();
        angles.sort_by(|a, b| a.total_cmp(b));
        let expected = [-SPREAD_FAN_DEGREES, 0.0, SPREAD_FAN_DEGREES];
        for (angle, want) in angles.iter().zip(expected) {
            assert!((angle - want).abs() < 0.01, "{} vs {}", angle, want);
        }
    }

    #[test]
    fn aura_hits_everything_nearby() {
        let mut s = state(Starter::Bulbasaur);
        let area = s.ace_stats().area;
        let near_a = place(&mut s, EnemyKind::Geodude, Vec2::new(area * 0.5, 0.0));
        let near_b = place(&mut s, EnemyKind::Geodude, Vec2::new(0.0, -area * 0.5));
        let far = place(&mut s, EnemyKind::Geodude, Vec2::new(area * 3.0, 0.0));
        let mut events = Vec::new();
        ace_attack(&mut s, &mut events);

        let full = s.world.enemies[far].max_hp;
        assert!(s.world.enemies[near_a].hp < full);
        assert!(s.world.enemies[near_b].hp < full);
        assert_eq!(s.world.enemies[far].hp, full);
    }

    #[test]
    fn melee_only_hits_the_facing_arc() {
        let mut s = state(Starter::Machop);
        let reach = s.ace_stats().area;
        let front = place(&mut s, EnemyKind::Geodude, Vec2::new(reach * 0.5, 0.0));
        let behind = place(&mut s, EnemyKind::Geodude, Vec2::new(-reach * 0.6, 0.0));
        let mut events = Vec::new();
        ace_attack(&mut s, &mut events);

        let full = s.world.enemies[behind].max_hp;
        assert!(s.world.enemies[front].hp < full);
        assert_eq!(s.world.enemies[behind].hp, full);
    }

    #[test]
    fn moving_melee_ignores_enemies_behind() {
        let mut s = state(Starter::Machop);
        s.ace.facing = Vec2::NEG_X;
        s.ace.move_dir = Vec2::NEG_X;
        let behind = place(&mut s, EnemyKind::Geodude, Vec2::new(30.0, 0.0));
        let mut events = Vec::new();
        ace_attack(&mut s, &mut events);

        assert_eq!(s.world.enemies[behind].hp, s.world.enemies[behind].max_hp);
        assert_eq!(s.ace.facing, Vec2::NEG_X);
    }

    #[test]
    fn standing_ace_turns_to_its_target() {
        let mut s = state(Starter::Machop);
        s.ace.facing = Vec2::NEG_X;
        let id = place(&mut s, EnemyKind::Geodude, Vec2::new(30.0, 0.0));
        let mut events = Vec::new();
        ace_attack(&mut s, &mut events);

        assert!(s.world.enemies[id].hp < s.world.enemies[id].max_hp);
        assert_eq!(s.ace.facing, Vec2::X);
    }

    #[test]
    fn piercing_shots_hit_each_enemy_once() {
        let mut s = state(Starter::Squirtle);
        let a = place(&mut s, EnemyKind::Geodude, Vec2::new(30.0, 0.0));
        let b = place(&mut s, EnemyKind::Geodude, Vec2::new(30.0, 5.0));
        s.world.projectiles.insert(Projectile {
            pos: Vec2::new(30.0, 0.0),
            vel: Vec2::ZERO,
            radius: 8.0,
            damage: 5.0,
            pierce_left: 1,
            expires_at: 100,
            hostile: false,
            source: AttackSource::Ace,
            hit: Vec::new(),
        });
        let mut events = Vec::new();
        update_projectiles(&mut s, &mut events);
        update_projectiles(&mut s, &mut events);

        let full = s.world.enemies[a].max_hp;
        assert_eq!(s.world.enemies[a].hp, full - 5.0);
        assert_eq!(s.world.enemies[b].hp, full - 5.0);
        assert!(s.world.projectiles.is_empty());
    }

    #[test]
    fn projectiles_expire() {
        let mut s = state(Starter::Pichu);
        s.world.projectiles.insert(Projectile {
            pos: Vec2::ZERO,
            vel: Vec2::X,
            radius: 4.0,
            damage: 1.0,
            pierce_left: 0,
            expires_at: 10,
            hostile: false,
            source: AttackSource::Ace,
            hit: Vec::new(),
        });
        let mut events = Vec::new();
        s.clock = 9;
        update_projectiles(&mut s, &mut events);
        assert_eq!(s.world.projectiles.len(), 1);
        s.clock = 10;
        update_projectiles(&mut s, &mut events);
        assert!(s.world.projectiles.is_empty());
    }

    #[test]
    fn invulnerability_gates_contact_damage() {
        let mut s = state(Starter::Charmander);
        place(&mut s, EnemyKind::Rattata, Vec2::new(5.0, 0.0));
        place(&mut s, EnemyKind::Rattata, Vec2::new(-5.0, 0.0));
        let start = s.ace.hp;
        let mut events = Vec::new();
        enemy_contact(&mut s, &mut events);
        assert_eq!(s.ace.hp, start - 6.0);

        s.clock = 10;
        enemy_contact(&mut s, &mut events);
        assert_eq!(s.ace.hp, start - 6.0);

        s.clock = 30;
        enemy_contact(&mut s, &mut events);
        assert_eq!(s.ace.hp, start - 12.0);
    }

    #[test]
    fn lethal_damage_defeats_the_ace() {
        let mut s = state(Starter::Charmander);
        let mut events = Vec::new();
        assert!(damage_ace(&mut s, 1000.0, AttackSource::Enemy(EnemyKind::Onix), &mut events));
        assert!(s.defeated);
        assert_eq!(s.ace.hp, 0.0);
        assert_eq!(events.last(), Some(&SurvivorsEvent::AceDefeated));
    }

    #[test]
    fn hostile_shots_hit_the_ace() {
        let mut s = state(Starter::Charmander);
        spawn_hostile_projectile(&mut s, Vec2::new(3.0, 0.0), Vec2::X, 4.0, EnemyKind::Koffing);
        let mut events = Vec::new();
        update_projectiles(&mut s, &mut events);
        assert!(s.world.projectiles.is_empty());
        assert!(matches!(events[0], SurvivorsEvent::AceDamaged { amount, .. } if amount == 4.0));
    }

    #[test]
    fn hostile_shots_wear_down_legion_units() {
        let mut s = state(Starter::Charmander);
        let mut events = Vec::new();
        apply_upgrade(&mut s, Upgrade::LegionSize, &mut events);
        s.world.legion[0].pos = Vec2::new(300.0, 0.0);

        events.clear();
        spawn_hostile_projectile(&mut s, Vec2::new(300.0, 0.0), Vec2::X, 4.0, EnemyKind::Koffing);
        update_projectiles(&mut s, &mut events);
        assert!(s.world.projectiles.is_empty());
        assert_eq!(s.world.legion[0].hp, LEGION.max_hp - 4.0);
        assert!(events.is_empty());

        spawn_hostile_projectile(&mut s, Vec2::new(300.0, 0.0), Vec2::X, 1000.0, EnemyKind::Koffing);
        update_projectiles(&mut s, &mut events);
        assert!(!s.world.legion[0].is_active());
        assert_eq!(events, vec![SurvivorsEvent::LegionUnitLost { index: 0 }]);
    }

    #[test]
    fn legion_units_trade_hits_and_fall() {
        let mut s = state(Starter::Charmander);
        let mut events = Vec::new();
        apply_upgrade(&mut s, Upgrade::LegionSize, &mut events);
        s.world.legion[0].pos = Vec2::new(300.0, 0.0);
        let id = place(&mut s, EnemyKind::Onix, Vec2::new(300.0, 10.0));

        events.clear();
        legion_contact(&mut s, &mut events);
        let full = s.world.enemies[id].max_hp;
        assert_eq!(s.world.enemies[id].hp, full - LEGION.contact_damage);
        // Cooldown blocks an immediate second hit.
        legion_contact(&mut s, &mut events);
        assert_eq!(s.world.enemies[id].hp, full - LEGION.contact_damage);

        s.clock = 30;
        legion_contact(&mut s, &mut events);
        assert!(!s.world.legion[0].is_active());
        assert!(events.contains(&SurvivorsEvent::LegionUnitLost { index: 0 }));
    }

    #[test]
    fn companions_attack_on_their_own_cooldown() {
        let mut s = state(Starter::Bulbasaur);
        let mut events = Vec::new();
        apply_upgrade(&mut s, Upgrade::Recruit(CompanionKind::Growlithe), &mut events);
        place(&mut s, EnemyKind::Rattata, Vec2::new(60.0, 0.0));
        events.clear();
        companion_attacks(&mut s, &mut events);
        assert!(events.contains(&SurvivorsEvent::AttackFired {
            source: AttackSource::Companion(CompanionKind::Growlithe),
            attack: CompanionKind::Growlithe.attack(),
        }));
        let ready = s.world.companions.values().next().map(|c| c.next_attack);
        assert!(ready.unwrap_or(0) > 0);
    }
}
