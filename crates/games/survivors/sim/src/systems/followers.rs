use crate::data::LEGION;
use crate::events::SurvivorsEvent;
use crate::world::SurvivorsState;
use glam::Vec2;
use std::f32::consts::TAU;

/// Angle between neighbouring companion slots in the trailing arc.
const FORMATION_ARC: f32 = 0.6;
/// Companions further than this from their slot teleport back.
const CATCH_UP_DISTANCE: f32 = 400.0;

/// Formation slot position for companion `slot` of `count`.
pub fn formation_slot(ace_pos: Vec2, facing: Vec2, slot: usize, count: usize, spacing: f32) -> Vec2 {
    let behind = -facing.normalize_or(Vec2::X);
    let offset = (slot as f32 - (count.saturating_sub(1)) as f32 / 2.0) * FORMATION_ARC;
    ace_pos + Vec2::from_angle(offset).rotate(behind) * spacing
}

pub fn move_companions(state: &mut SurvivorsState) {
    let count = state.world.companions.len();
    let ace_pos = state.ace.pos;
    let facing = state.ace.facing;
    let spacing = state.config.companion_spacing;
    let step = state.ace_stats().move_speed * 1.3 * state.config.dt();

    for companion in state.world.companions.values_mut() {
        let target = formation_slot(ace_pos, facing, companion.slot, count, spacing);
        let offset = target - companion.pos;
        let distance = offset.length();
        if distance > CATCH_UP_DISTANCE || distance <= step {
            companion.pos = target;
        } else {
            companion.pos += offset / distance * step;
        }
    }
}

/// Spin the legion around the Ace and bring fallen units back once their
/// respawn timer runs out.
pub fn update_legion(state: &mut SurvivorsState, events: &mut Vec<SurvivorsEvent>) {
    let count = state.world.legion.len();
    if count == 0 {
        return;
    }
    let radius = state.legion_orbit_radius();
    let base = state.clock as f32 * state.config.dt() * state.config.legion_orbit_speed;
    let ace_pos = state.ace.pos;
    let clock = state.clock;

    for (index, unit) in state.world.legion.iter_mut().enumerate() {
        if let Some(at) = unit.respawn_at {
            if clock >= at {
                unit.respawn_at = None;
                unit.hp = LEGION.max_hp;
                events.push(SurvivorsEvent::LegionUnitRestored { index });
            }
        }
        let angle = base + TAU * index as f32 / count as f32;
        unit.pos = ace_pos + Vec2::from_angle(angle) * radius;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurvivorsConfig;
    use crate::data::CompanionKind;
    use crate::upgrades::{apply_upgrade, Upgrade};

    #[test]
    fn single_companion_trails_directly_behind() {
        let slot = formation_slot(Vec2::ZERO, Vec2::X, 0, 1, 48.0);
        assert!((slot - Vec2::new(-48.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn companions_converge_on_their_slots() {
        let mut state = SurvivorsState::new(SurvivorsConfig::default(), 2);
        let mut events = Vec::new();
        apply_upgrade(&mut state, Upgrade::Recruit(CompanionKind::Eevee), &mut events);
        apply_upgrade(&mut state, Upgrade::Recruit(CompanionKind::Psyduck), &mut events);
        for _ in 0..60 {
            move_companions(&mut state);
        }
        let positions: Vec<Vec2> = state.world.companions.values().map(|c| c.pos).collect();
        for (slot, pos) in positions.iter().enumerate() {
            let target = formation_slot(Vec2::ZERO, Vec2::X, slot, 2, 48.0);
            assert!(pos.distance(target) < 1e-3);
        }
        assert!(positions[0].distance(positions[1]) > 1.0);
    }

    #[test]
    fn legion_orbits_and_respawns() {
        let mut state = SurvivorsState::new(SurvivorsConfig::default(), 2);
        let mut events = Vec::new();
        apply_upgrade(&mut state, Upgrade::LegionSize, &mut events);
        apply_upgrade(&mut state, Upgrade::LegionSize, &mut events);
        state.world.legion[1].respawn_at = Some(10);
        state.world.legion[1].hp = 0.0;

        events.clear();
        update_legion(&mut state, &mut events);
        let radius = state.legion_orbit_radius();
        for unit in &state.world.legion {
            assert!((unit.pos.length() - radius).abs() < 1e-3);
        }
        assert!(!state.world.legion[1].is_active());

        state.clock = 10;
        update_legion(&mut state, &mut events);
        assert!(state.world.legion[1].is_active());
        assert_eq!(events, vec![SurvivorsEvent::LegionUnitRestored { index: 1 }]);
    }
}
