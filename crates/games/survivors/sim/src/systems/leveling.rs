use crate::events::SurvivorsEvent;
use crate::upgrades::{apply_upgrade, build_offer};
use crate::world::SurvivorsState;

/// Turn banked XP into levels, evolve on threshold levels and queue the next
/// upgrade offer.
pub fn update_leveling(state: &mut SurvivorsState, events: &mut Vec<SurvivorsEvent>) {
    loop {
        let need = state.config.xp_to_next(state.ace.level);
        if state.ace.xp < need {
            break;
        }
        state.ace.xp -= need;
        state.ace.level += 1;
        state.ace.pending_levels += 1;
        evolve_if_due(state, events);
    }

    while state.offer.is_none() && state.ace.pending_levels > 0 {
        state.ace.pending_levels -= 1;
        let offer = build_offer(state);
        events.push(SurvivorsEvent::LevelUp {
            level: offer.level,
            choices: offer.choices.clone(),
        });

        if state.config.auto_pick_upgrades {
            if let Some(&upgrade) = offer.choices.first() {
                apply_upgrade(state, upgrade, events);
            }
        } else {
            state.offer = Some(offer);
        }
    }
}

fn evolve_if_due(state: &mut SurvivorsState, events: &mut Vec<SurvivorsEvent>) {
    let stage = state.config.stage_for_level(state.ace.level);
    if stage <= state.ace.stage {
        return;
    }
    let old_max = state.ace_max_hp();
    state.ace.stage = stage;
    let new_max = state.ace_max_hp();
    // Keep the hp ratio across the stage change.
    if old_max > 0.0 {
        state.ace.hp = (state.ace.hp * new_max / old_max).min(new_max);
    }

    let species = state.ace.starter.species_at(stage);
    events.push(SurvivorsEvent::Evolved {
        stage,
        species: species.name,
    });
    tracing::info!(
        stage,
        species = species.name,
        level = state.ace.level,
        "ace evolved"
    );
}

/// Resolve the pending offer with the choice at `index`. Out-of-range
/// choices and choices without an offer are ignored.
pub fn choose_upgrade(
    state: &mut SurvivorsState,
    index: usize,
    events: &mut Vec<SurvivorsEvent>,
) -> bool {
    let Some(upgrade) = state
        .offer
        .as_ref()
        .and_then(|offer| offer.choices.get(index).copied())
    else {
        return false;
    };
    state.offer = None;
    apply_upgrade(state, upgrade, events);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurvivorsConfig;
    use crate::data::Species;

    fn state(auto_pick: bool) -> SurvivorsState {
        let config = SurvivorsConfig {
            auto_pick_upgrades: auto_pick,
            ..SurvivorsConfig::default()
        };
        SurvivorsState::new(config, 4)
    }

    #[test]
    fn overflow_xp_carries_over() {
        let mut s = state(false);
        s.ace.xp = 7;
        let mut events = Vec::new();
        update_leveling(&mut s, &mut events);
        assert_eq!(s.ace.level, 2);
        assert_eq!(s.ace.xp, 2);
        assert!(s.offer.is_some());
        assert!(matches!(events[0], SurvivorsEvent::LevelUp { level: 2, .. }));
    }

    #[test]
    fn multiple_levels_queue_offers() {
        let mut s = state(false);
        s.ace.xp = 5 + 12 + 21;
        let mut events = Vec::new();
        update_leveling(&mut s, &mut events);
        assert_eq!(s.ace.level, 4);
        assert_eq!(s.ace.pending_levels, 2);

        let applied = choose_upgrade(&mut s, 0, &mut events);
        assert!(applied);
        assert!(s.offer.is_none());
        update_leveling(&mut s, &mut events);
        assert!(s.offer.is_some());
        assert_eq!(s.ace.pending_levels, 1);
    }

    #[test]
    fn invalid_choice_is_ignored() {
        let mut s = state(false);
        let mut events = Vec::new();
        assert!(!choose_upgrade(&mut s, 0, &mut events));
        s.ace.xp = 5;
        update_leveling(&mut s, &mut events);
        assert!(!choose_upgrade(&mut s, 9, &mut events));
        assert!(s.offer.is_some());
    }

    #[test]
    fn auto_pick_never_leaves_an_offer() {
        let mut s = state(true);
        s.ace.xp = 200;
        let mut events = Vec::new();
        update_leveling(&mut s, &mut events);
        assert!(s.offer.is_none());
        assert_eq!(s.ace.pending_levels, 0);
        let applied = events
            .iter()
            .filter(|e| matches!(e, SurvivorsEvent::UpgradeApplied { .. }))
            .count();
        assert_eq!(applied as u32, s.ace.level - 1);
    }

    #[test]
    fn evolution_at_threshold_scales_hp() {
        let mut s = state(false);
        s.ace.level = 9;
        s.ace.hp = 45.0;
        s.ace.xp = s.config.xp_to_next(9);
        let mut events = Vec::new();
        update_leveling(&mut s, &mut events);

        assert_eq!(s.ace.stage, 1);
        assert!(events.contains(&SurvivorsEvent::Evolved {
            stage: 1,
            species: Species::CHARMELEON.name
        }));
        assert!((s.ace_max_hp() - 117.0).abs() < 1e-3);
        assert!((s.ace.hp - 58.5).abs() < 1e-3);
    }
}
