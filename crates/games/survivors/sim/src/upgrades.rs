use crate::data::CompanionKind;
use crate::events::SurvivorsEvent;
use crate::world::{Companion, LegionUnit, SurvivorsState};
use rand::seq::SliceRandom;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Upgrade {
    /// +15% attack damage.
    Damage,
    /// -8% attack cooldown.
    Haste,
    /// +8% move speed.
    Swiftness,
    /// +20 max hp (scaled by evolution stage), healed immediately.
    Vitality,
    /// +25% pickup radius.
    Magnet,
    /// +1 projectile per attack.
    Multishot,
    Recruit(CompanionKind),
    /// +20% companion damage.
    CompanionPower,
    LegionSize,
    /// +20% legion contact damage.
    LegionPower,
    /// Heal 30% of max hp. Offered only when nothing else is available.
    Recover,
}

impl Upgrade {
    pub fn label(self) -> String {
        match self {
            Upgrade::Damage => "Damage".to_string(),
            Upgrade::Haste => "Haste".to_string(),
            Upgrade::Swiftness => "Swiftness".to_string(),
            Upgrade::Vitality => "Vitality".to_string(),
            Upgrade::Magnet => "Magnet".to_string(),
            Upgrade::Multishot => "Multishot".to_string(),
            Upgrade::Recruit(kind) => format!("Recruit {}", kind.name()),
            Upgrade::CompanionPower => "Companion Power".to_string(),
            Upgrade::LegionSize => "Legion Size".to_string(),
            Upgrade::LegionPower => "Legion Power".to_string(),
            Upgrade::Recover => "Recover".to_string(),
        }
    }
}

/// How many times each stacking upgrade has been taken.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpgradeStacks {
    pub damage: u8,
    pub haste: u8,
    pub swiftness: u8,
    pub vitality: u8,
    pub magnet: u8,
    pub multishot: u8,
    pub companion_power: u8,
    pub legion_power: u8,
}

impl UpgradeStacks {
    fn slot(&mut self, upgrade: Upgrade) -> Option<&mut u8> {
        match upgrade {
            Upgrade::Damage => Some(&mut self.damage),
            Upgrade::Haste => Some(&mut self.haste),
            Upgrade::Swiftness => Some(&mut self.swiftness),
            Upgrade::Vitality => Some(&mut self.vitality),
            Upgrade::Magnet => Some(&mut self.magnet),
            Upgrade::Multishot => Some(&mut self.multishot),
            Upgrade::CompanionPower => Some(&mut self.companion_power),
            Upgrade::LegionPower => Some(&mut self.legion_power),
            Upgrade::Recruit(_) | Upgrade::LegionSize | Upgrade::Recover => None,
        }
    }

    pub fn stacks(&self, upgrade: Upgrade) -> u8 {
        match upgrade {
            Upgrade::Damage => self.damage,
            Upgrade::Haste => self.haste,
            Upgrade::Swiftness => self.swiftness,
            Upgrade::Vitality => self.vitality,
            Upgrade::Magnet => self.magnet,
            Upgrade::Multishot => self.multishot,
            Upgrade::CompanionPower => self.companion_power,
            Upgrade::LegionPower => self.legion_power,
            Upgrade::Recruit(_) | Upgrade::LegionSize | Upgrade::Recover => 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeOffer {
    pub level: u32,
    pub choices: Vec<Upgrade>,
}

pub fn is_eligible(state: &SurvivorsState, upgrade: Upgrade) -> bool {
    let cap = state.config.upgrade_stack_cap;
    let stacks = state.upgrades.stacks(upgrade);
    match upgrade {
        Upgrade::Damage
        | Upgrade::Haste
        | Upgrade::Swiftness
        | Upgrade::Vitality
        | Upgrade::Magnet => stacks < cap,
        Upgrade::Multishot => {
            state.ace.attack().fires_projectiles() && stacks < state.config.multishot_cap
        }
        Upgrade::Recruit(kind) => {
            state.world.companions.len() < state.config.companion_cap
                && !state.world.has_companion(kind)
        }
        Upgrade::CompanionPower => !state.world.companions.is_empty() && stacks < cap,
        Upgrade::LegionSize => state.world.legion.len() < state.config.legion_cap,
        Upgrade::LegionPower => !state.world.legion.is_empty() && stacks < cap,
        Upgrade::Recover => true,
    }
}

fn candidates() -> Vec<Upgrade> {
    let mut all = vec![
        Upgrade::Damage,
        Upgrade::Haste,
        Upgrade::Swiftness,
        Upgrade::Vitality,
        Upgrade::Magnet,
        Upgrade::Multishot,
        Upgrade::CompanionPower,
        Upgrade::LegionSize,
        Upgrade::LegionPower,
    ];
    all.extend(CompanionKind::ALL.into_iter().map(Upgrade::Recruit));
    all
}

/// Draw up to `upgrade_choices` distinct eligible upgrades.
pub fn build_offer(state: &mut SurvivorsState) -> UpgradeOffer {
    let mut pool: Vec<Upgrade> = candidates()
        .into_iter()
        .filter(|&u| is_eligible(state, u))
        .collect();
    pool.shuffle(&mut state.rng);
    pool.truncate(state.config.upgrade_choices);
    if pool.is_empty() {
        pool.push(Upgrade::Recover);
    }
    UpgradeOffer {
        level: state.ace.level,
        choices: pool,
    }
}

pub fn apply_upgrade(state: &mut SurvivorsState, upgrade: Upgrade, events: &mut Vec<SurvivorsEvent>) {
    let max_before = state.ace_max_hp();
    if let Some(slot) = state.upgrades.slot(upgrade) {
        *slot = slot.saturating_add(1);
    }

    match upgrade {
        Upgrade::Vitality => {
            let gained = state.ace_max_hp() - max_before;
            state.ace.hp += gained;
        }
        Upgrade::Recover => {
            let max_hp = state.ace_max_hp();
            state.ace.hp = (state.ace.hp + max_hp * 0.3).min(max_hp);
        }
        Upgrade::Recruit(kind) => {
            let slot = state.world.companions.len();
            state.world.companions.insert(Companion {
                kind,
                pos: state.ace.pos,
                slot,
                next_attack: state.clock,
            });
            events.push(SurvivorsEvent::CompanionRecruited { kind });
            tracing::info!(companion = kind.name(), "companion recruited");
        }
        Upgrade::LegionSize => {
            state.world.legion.push(LegionUnit::new(state.ace.pos));
        }
        _ => {}
    }

    events.push(SurvivorsEvent::UpgradeApplied { upgrade });
}
