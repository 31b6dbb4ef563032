use crate::data::EnemyKind;
use crate::events::SurvivorsEvent;
use crate::systems::spawn::spawn_enemy;
use crate::world::SurvivorsState;

/// Advance the cycle counter from the clock. Starts new cycles, spawns the
/// cycle boss when due, and marks the run complete once all cycles elapsed.
pub fn update_cycle(state: &mut SurvivorsState, events: &mut Vec<SurvivorsEvent>) {
    let cycle_ticks = state.config.cycle_ticks();

    if state.clock >= state.config.run_ticks() {
        if !state.completed && !state.defeated {
            state.completed = true;
            events.push(SurvivorsEvent::RunCompleted);
            tracing::info!(kills = state.kills, level = state.ace.level, "run completed");
        }
        return;
    }

    let cycle = (state.clock / cycle_ticks + 1).min(state.config.cycles_total as u64) as u8;
    if cycle == state.cycle {
        return;
    }

    state.cycle = cycle;
    // Spawn pacing restarts with the new cycle's interval.
    state.next_spawn = state.clock;
    events.push(SurvivorsEvent::CycleStarted { cycle });
    tracing::info!(cycle, enemies = state.world.enemies.len(), "cycle started");

    if state.config.is_boss_cycle(cycle) {
        if let Some(kind) = EnemyKind::boss_for_cycle(cycle) {
            let id = spawn_enemy(state, kind);
            events.push(SurvivorsEvent::BossSpawned { id, kind });
            tracing::info!(cycle, boss = kind.name(), "boss spawned");
        }
    }
}
