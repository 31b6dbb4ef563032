use crate::world::SurvivorsState;
use glam::Vec2;
use sim_core::Tick;
use survivors_types::{
    AceInfo, CompanionInfo, CycleInfo, EnemyInfo, LegionUnitInfo, PickupInfo, Point,
    ProjectileInfo, SurvivorsObservation, UpgradeOfferInfo,
};

fn point(v: Vec2) -> Point {
    Point::new(v.x, v.y)
}

pub fn build_observation(state: &SurvivorsState, tick: Tick) -> SurvivorsObservation {
    let config = &state.config;
    let ace = &state.ace;
    let species = ace.starter.species_at(ace.stage);
    let cycle_ticks = config.cycle_ticks();
    let in_cycle = if state.cycle == 0 {
        0
    } else {
        state.clock.saturating_sub((state.cycle as u64 - 1) * cycle_ticks)
    };

    SurvivorsObservation {
        tick,
        ticks_per_second: config.tick_hz,
        elapsed_secs: state.elapsed_secs(),
        paused: state.is_frozen(),

        cycle: CycleInfo {
            cycle: state.cycle,
            cycles_total: config.cycles_total,
            elapsed_in_cycle_secs: in_cycle.min(cycle_ticks) as f32 * config.dt(),
            cycle_length_secs: config.cycle_length.as_secs_f32(),
            boss_alive: state.world.boss_alive(),
        },

        ace: AceInfo {
            starter: ace.starter.name().to_string(),
            dex: species.dex,
            species: species.name.to_string(),
            position: point(ace.pos),
            facing: point(ace.facing),
            hp: ace.hp,
            max_hp: state.ace_max_hp(),
            level: ace.level,
            xp: ace.xp,
            xp_to_next: config.xp_to_next(ace.level),
            stage: ace.stage,
            invulnerable: state.clock < ace.invulnerable_until,
        },

        offer: state.offer.as_ref().map(|offer| UpgradeOfferInfo {
            level: offer.level,
            choices: offer.choices.iter().map(|u| u.label()).collect(),
        }),

        kills: state.kills,
        coins_earned: state.coins_earned,

        enemies: state
            .world
            .enemies
            .values()
            .map(|e| EnemyInfo {
                kind: e.kind.name().to_string(),
                dex: e.kind.stats().species.dex,
                position: point(e.pos),
                hp: e.hp,
                max_hp: e.max_hp,
                boss: e.is_boss(),
            })
            .collect(),
        projectiles: state
            .world
            .projectiles
            .values()
            .map(|p| ProjectileInfo {
                position: point(p.pos),
                velocity: point(p.vel),
                radius: p.radius,
                hostile: p.hostile,
            })
            .collect(),
        pickups: state
            .world
            .pickups
            .values()
            .map(|p| PickupInfo {
                kind: p.kind.name().to_string(),
                position: point(p.pos),
                value: p.value,
            })
            .collect(),
        companions: state
            .world
            .companions
            .values()
            .map(|c| CompanionInfo {
                kind: c.kind.name().to_string(),
                dex: c.kind.species().dex,
                position: point(c.pos),
            })
            .collect(),
        legion: state
            .world
            .legion
            .iter()
            .map(|u| LegionUnitInfo {
                position: point(u.pos),
                hp: u.hp,
                active: u.is_active(),
            })
            .collect(),
    }
}
