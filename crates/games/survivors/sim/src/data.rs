//! Roster tables: species, starters, enemies, companions, legion and the
//! evolution stage multipliers.
//!
//! Everything here is static data. Gameplay code reads it through the
//! accessor methods so tuning changes stay in one file.

use serde::{Deserialize, Serialize};
use sim_core::Micros;

/// A creature as known to the sprite repository (PMD dex number).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Species {
    pub dex: u16,
    pub name: &'static str,
}

impl Species {
    pub const BULBASAUR: Species = Species { dex: 1, name: "Bulbasaur" };
    pub const IVYSAUR: Species = Species { dex: 2, name: "Ivysaur" };
    pub const VENUSAUR: Species = Species { dex: 3, name: "Venusaur" };
    pub const CHARMANDER: Species = Species { dex: 4, name: "Charmander" };
    pub const CHARMELEON: Species = Species { dex: 5, name: "Charmeleon" };
    pub const CHARIZARD: Species = Species { dex: 6, name: "Charizard" };
    pub const SQUIRTLE: Species = Species { dex: 7, name: "Squirtle" };
    pub const WARTORTLE: Species = Species { dex: 8, name: "Wartortle" };
    pub const BLASTOISE: Species = Species { dex: 9, name: "Blastoise" };
    pub const RATTATA: Species = Species { dex: 19, name: "Rattata" };
    pub const SPEAROW: Species = Species { dex: 21, name: "Spearow" };
    pub const PIKACHU: Species = Species { dex: 25, name: "Pikachu" };
    pub const RAICHU: Species = Species { dex: 26, name: "Raichu" };
    pub const ZUBAT: Species = Species { dex: 41, name: "Zubat" };
    pub const ODDISH: Species = Species { dex: 43, name: "Oddish" };
    pub const PSYDUCK: Species = Species { dex: 54, name: "Psyduck" };
    pub const GROWLITHE: Species = Species { dex: 58, name: "Growlithe" };
    pub const MACHOP: Species = Species { dex: 66, name: "Machop" };
    pub const MACHOKE: Species = Species { dex: 67, name: "Machoke" };
    pub const MACHAMP: Species = Species { dex: 68, name: "Machamp" };
    pub const GEODUDE: Species = Species { dex: 74, name: "Geodude" };
    pub const MAGNEMITE: Species = Species { dex: 81, name: "Magnemite" };
    pub const ONIX: Species = Species { dex: 95, name: "Onix" };
    pub const KOFFING: Species = Species { dex: 109, name: "Koffing" };
    pub const EEVEE: Species = Species { dex: 133, name: "Eevee" };
    pub const SNORLAX: Species = Species { dex: 143, name: "Snorlax" };
    pub const PICHU: Species = Species { dex: 172, name: "Pichu" };

    /// Every species the game can put on screen.
    pub const ALL: [Species; 27] = [
        Species::BULBASAUR,
        Species::IVYSAUR,
        Species::VENUSAUR,
        Species::CHARMANDER,
        Species::CHARMELEON,
        Species::CHARIZARD,
        Species::SQUIRTLE,
        Species::WARTORTLE,
        Species::BLASTOISE,
        Species::RATTATA,
        Species::SPEAROW,
        Species::PIKACHU,
        Species::RAICHU,
        Species::ZUBAT,
        Species::ODDISH,
        Species::PSYDUCK,
        Species::GROWLITHE,
        Species::MACHOP,
        Species::MACHOKE,
        Species::MACHAMP,
        Species::GEODUDE,
        Species::MAGNEMITE,
        Species::ONIX,
        Species::KOFFING,
        Species::EEVEE,
        Species::SNORLAX,
        Species::PICHU,
    ];
}

/// How an attacker delivers damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackType {
    /// Single fast projectile at the nearest enemy.
    Bolt,
    /// Fan of projectiles.
    Spread,
    /// Slow projectile that passes through several enemies.
    Pierce,
    /// Damages everything within a radius around the attacker.
    Aura,
    /// Short-range arc in the aim direction.
    Melee,
}

/// Sprite animation played for an attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackAnim {
    pub name: &'static str,
    pub frames: u8,
    /// Frame on which the hit visually lands.
    pub hit_frame: u8,
}

impl AttackType {
    pub const ALL: [AttackType; 5] = [
        AttackType::Bolt,
        AttackType::Spread,
        AttackType::Pierce,
        AttackType::Aura,
        AttackType::Melee,
    ];

    pub fn anim(self) -> AttackAnim {
        match self {
            AttackType::Bolt => AttackAnim { name: "Shoot", frames: 7, hit_frame: 4 },
            AttackType::Spread => AttackAnim { name: "Attack", frames: 10, hit_frame: 5 },
            AttackType::Pierce => AttackAnim { name: "Shoot", frames: 7, hit_frame: 4 },
            AttackType::Aura => AttackAnim { name: "Charge", frames: 8, hit_frame: 6 },
            AttackType::Melee => AttackAnim { name: "Strike", frames: 6, hit_frame: 3 },
        }
    }

    pub fn fires_projectiles(self) -> bool {
        matches!(self, AttackType::Bolt | AttackType::Spread | AttackType::Pierce)
    }

    pub fn name(self) -> &'static str {
        match self {
            AttackType::Bolt => "Bolt",
            AttackType::Spread => "Spread",
            AttackType::Pierce => "Pierce",
            AttackType::Aura => "Aura",
            AttackType::Melee => "Melee",
        }
    }
}

/// Offensive and defensive numbers for an attacker.
///
/// `area` is the projectile radius for projectile attacks, the damage radius
/// for auras and the reach for melee.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatBlock {
    pub max_hp: f32,
    pub move_speed: f32,
    pub damage: f32,
    pub cooldown: Micros,
    pub range: f32,
    pub projectile_speed: f32,
    pub projectiles: u8,
    pub pierce: u8,
    pub area: f32,
}

/// What it takes to make a starter selectable in the lobby.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnlockRequirement {
    Default,
    Coins(u32),
    ReachCycle(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Starter {
    Charmander,
    Squirtle,
    Bulbasaur,
    Pichu,
    Machop,
}

impl Starter {
    pub const ALL: [Starter; 5] = [
        Starter::Charmander,
        Starter::Squirtle,
        Starter::Bulbasaur,
        Starter::Pichu,
        Starter::Machop,
    ];

    pub fn name(self) -> &'static str {
        self.line()[0].name
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Starter> {
        Starter::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Evolution line, indexed by stage.
    pub fn line(self) -> [Species; 3] {
        match self {
            Starter::Charmander => [Species::CHARMANDER, Species::CHARMELEON, Species::CHARIZARD],
            Starter::Squirtle => [Species::SQUIRTLE, Species::WARTORTLE, Species::BLASTOISE],
            Starter::Bulbasaur => [Species::BULBASAUR, Species::IVYSAUR, Species::VENUSAUR],
            Starter::Pichu => [Species::PICHU, Species::PIKACHU, Species::RAICHU],
            Starter::Machop => [Species::MACHOP, Species::MACHOKE, Species::MACHAMP],
        }
    }

    pub fn species_at(self, stage: u8) -> Species {
        let line = self.line();
        line[(stage as usize).min(line.len() - 1)]
    }

    pub fn attack(self) -> AttackType {
        match self {
            Starter::Charmander => AttackType::Spread,
            Starter::Squirtle => AttackType::Pierce,
            Starter::Bulbasaur => AttackType::Aura,
            Starter::Pichu => AttackType::Bolt,
            Starter::Machop => AttackType::Melee,
        }
    }

    pub fn base_stats(self) -> StatBlock {
        match self {
            Starter::Charmander => StatBlock {
                max_hp: 90.0,
                move_speed: 150.0,
                damage: 7.0,
                cooldown: Micros::from_millis(900),
                range: 260.0,
                projectile_speed: 360.0,
                projectiles: 3,
                pierce: 0,
                area: 8.0,
            },
            Starter::Squirtle => StatBlock {
                max_hp: 110.0,
                move_speed: 135.0,
                damage: 12.0,
                cooldown: Micros::from_millis(1200),
                range: 320.0,
                projectile_speed: 300.0,
                projectiles: 1,
                pierce: 3,
                area: 12.0,
            },
            Starter::Bulbasaur => StatBlock {
                max_hp: 120.0,
                move_speed: 130.0,
                damage: 6.0,
                cooldown: Micros::from_millis(1000),
                range: 110.0,
                projectile_speed: 0.0,
                projectiles: 0,
                pierce: 0,
                area: 110.0,
            },
            Starter::Pichu => StatBlock {
                max_hp: 70.0,
                move_speed: 170.0,
                damage: 9.0,
                cooldown: Micros::from_millis(600),
                range: 300.0,
                projectile_speed: 520.0,
                projectiles: 1,
                pierce: 0,
                area: 6.0,
            },
            Starter::Machop => StatBlock {
                max_hp: 130.0,
                move_speed: 145.0,
                damage: 16.0,
                cooldown: Micros::from_millis(800),
                range: 70.0,
                projectile_speed: 0.0,
                projectiles: 0,
                pierce: 0,
                area: 70.0,
            },
        }
    }

    pub fn unlock(self) -> UnlockRequirement {
        match self {
            Starter::Charmander | Starter::Squirtle | Starter::Bulbasaur => {
                UnlockRequirement::Default
            }
            Starter::Pichu => UnlockRequirement::Coins(300),
            Starter::Machop => UnlockRequirement::ReachCycle(5),
        }
    }
}

/// Movement and attack pattern of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behavior {
    /// Walk straight at the Ace.
    Chase,
    /// Chase while weaving side to side.
    Swarm,
    /// Creep closer, then charge in a fixed direction.
    Dash,
    /// Slow, heavy chase.
    Tank,
    /// Hold a preferred distance and shoot.
    Ranged,
    /// Chase and fire radial volleys.
    Boss,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    pub species: Species,
    pub max_hp: f32,
    pub speed: f32,
    pub damage: f32,
    pub radius: f32,
    pub xp: u32,
    pub behavior: Behavior,
    /// First cycle in which the kind joins the spawn pool.
    pub first_cycle: u8,
    /// Relative spawn weight among unlocked kinds. Bosses use 0.
    pub weight: u32,
    pub boss: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Rattata,
    Zubat,
    Spearow,
    Geodude,
    Koffing,
    Onix,
    Snorlax,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 7] = [
        EnemyKind::Rattata,
        EnemyKind::Zubat,
        EnemyKind::Spearow,
        EnemyKind::Geodude,
        EnemyKind::Koffing,
        EnemyKind::Onix,
        EnemyKind::Snorlax,
    ];

    pub fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Rattata => EnemyStats {
                species: Species::RATTATA,
                max_hp: 8.0,
                speed: 75.0,
                damage: 6.0,
                radius: 12.0,
                xp: 1,
                behavior: Behavior::Chase,
                first_cycle: 1,
                weight: 10,
                boss: false,
            },
            EnemyKind::Zubat => EnemyStats {
                species: Species::ZUBAT,
                max_hp: 5.0,
                speed: 115.0,
                damage: 4.0,
                radius: 10.0,
                xp: 1,
                behavior: Behavior::Swarm,
                first_cycle: 1,
                weight: 8,
                boss: false,
            },
            EnemyKind::Spearow => EnemyStats {
                species: Species::SPEAROW,
                max_hp: 12.0,
                speed: 65.0,
                damage: 7.0,
                radius: 12.0,
                xp: 2,
                behavior: Behavior::Dash,
                first_cycle: 2,
                weight: 6,
                boss: false,
            },
            EnemyKind::Geodude => EnemyStats {
                species: Species::GEODUDE,
                max_hp: 45.0,
                speed: 40.0,
                damage: 12.0,
                radius: 16.0,
                xp: 4,
                behavior: Behavior::Tank,
                first_cycle: 3,
                weight: 4,
                boss: false,
            },
            EnemyKind::Koffing => EnemyStats {
                species: Species::KOFFING,
                max_hp: 16.0,
                speed: 55.0,
                damage: 5.0,
                radius: 14.0,
                xp: 3,
                behavior: Behavior::Ranged,
                first_cycle: 4,
                weight: 4,
                boss: false,
            },
            EnemyKind::Onix => EnemyStats {
                species: Species::ONIX,
                max_hp: 900.0,
                speed: 55.0,
                damage: 20.0,
                radius: 34.0,
                xp: 50,
                behavior: Behavior::Boss,
                first_cycle: 5,
                weight: 0,
                boss: true,
            },
            EnemyKind::Snorlax => EnemyStats {
                species: Species::SNORLAX,
                max_hp: 1800.0,
                speed: 45.0,
                damage: 28.0,
                radius: 40.0,
                xp: 100,
                behavior: Behavior::Boss,
                first_cycle: 10,
                weight: 0,
                boss: true,
            },
        }
    }

    pub fn name(self) -> &'static str {
        self.stats().species.name
    }

    /// Regular kinds that may spawn during `cycle`.
    pub fn spawn_pool(cycle: u8) -> Vec<EnemyKind> {
        EnemyKind::ALL
            .into_iter()
            .filter(|k| {
                let s = k.stats();
                !s.boss && s.weight > 0 && s.first_cycle <= cycle
            })
            .collect()
    }

    /// The strongest boss available by `cycle`.
    pub fn boss_for_cycle(cycle: u8) -> Option<EnemyKind> {
        EnemyKind::ALL
            .into_iter()
            .filter(|k| {
                let s = k.stats();
                s.boss && s.first_cycle <= cycle
            })
            .max_by_key(|k| k.stats().first_cycle)
    }
}

/// Recruitable followers that trail the Ace and auto-attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanionKind {
    Eevee,
    Growlithe,
    Psyduck,
    Oddish,
}

impl CompanionKind {
    pub const ALL: [CompanionKind; 4] = [
        CompanionKind::Eevee,
        CompanionKind::Growlithe,
        CompanionKind::Psyduck,
        CompanionKind::Oddish,
    ];

    pub fn species(self) -> Species {
        match self {
            CompanionKind::Eevee => Species::EEVEE,
            CompanionKind::Growlithe => Species::GROWLITHE,
            CompanionKind::Psyduck => Species::PSYDUCK,
            CompanionKind::Oddish => Species::ODDISH,
        }
    }

    pub fn name(self) -> &'static str {
        self.species().name
    }

    pub fn attack(self) -> AttackType {
        match self {
            CompanionKind::Eevee => AttackType::Bolt,
            CompanionKind::Growlithe => AttackType::Spread,
            CompanionKind::Psyduck => AttackType::Pierce,
            CompanionKind::Oddish => AttackType::Aura,
        }
    }

    /// Companions do not take damage; `max_hp` and `move_speed` are unused.
    pub fn stats(self) -> StatBlock {
        match self {
            CompanionKind::Eevee => StatBlock {
                max_hp: 0.0,
                move_speed: 0.0,
                damage: 5.0,
                cooldown: Micros::from_millis(800),
                range: 260.0,
                projectile_speed: 460.0,
                projectiles: 1,
                pierce: 0,
                area: 6.0,
            },
            CompanionKind::Growlithe => StatBlock {
                max_hp: 0.0,
                move_speed: 0.0,
                damage: 4.0,
                cooldown: Micros::from_millis(1100),
                range: 220.0,
                projectile_speed: 340.0,
                projectiles: 2,
                pierce: 0,
                area: 7.0,
            },
            CompanionKind::Psyduck => StatBlock {
                max_hp: 0.0,
                move_speed: 0.0,
                damage: 7.0,
                cooldown: Micros::from_millis(1400),
                range: 280.0,
                projectile_speed: 280.0,
                projectiles: 1,
                pierce: 2,
                area: 10.0,
            },
            CompanionKind::Oddish => StatBlock {
                max_hp: 0.0,
                move_speed: 0.0,
                damage: 3.0,
                cooldown: Micros::from_millis(1000),
                range: 90.0,
                projectile_speed: 0.0,
                projectiles: 0,
                pierce: 0,
                area: 90.0,
            },
        }
    }
}

/// Orbiting legion units: all the same species, contact damage only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegionStats {
    pub species: Species,
    pub max_hp: f32,
    pub contact_damage: f32,
    pub radius: f32,
    /// Minimum time between two hits of the same unit on the same enemy.
    pub hit_cooldown: Micros,
    pub respawn: Micros,
}

pub const LEGION: LegionStats = LegionStats {
    species: Species::MAGNEMITE,
    max_hp: 20.0,
    contact_damage: 4.0,
    radius: 10.0,
    hit_cooldown: Micros::from_millis(500),
    respawn: Micros::from_secs(5),
};

/// Multipliers applied to the Ace's base stats at each evolution stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageMultipliers {
    pub hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub cooldown: f32,
    pub range: f32,
    pub size: f32,
}

pub const STAGE_MULTIPLIERS: [StageMultipliers; 3] = [
    StageMultipliers { hp: 1.0, damage: 1.0, speed: 1.0, cooldown: 1.0, range: 1.0, size: 1.0 },
    StageMultipliers { hp: 1.3, damage: 1.35, speed: 1.05, cooldown: 0.9, range: 1.1, size: 1.15 },
    StageMultipliers { hp: 1.7, damage: 1.8, speed: 1.1, cooldown: 0.8, range: 1.2, size: 1.3 },
];

pub const MAX_STAGE: u8 = (STAGE_MULTIPLIERS.len() - 1) as u8;

pub fn stage_multipliers(stage: u8) -> StageMultipliers {
    STAGE_MULTIPLIERS[(stage as usize).min(STAGE_MULTIPLIERS.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_lookup_is_case_insensitive() {
        assert_eq!(Starter::from_name("pichu"), Some(Starter::Pichu));
        assert_eq!(Starter::from_name(" MACHOP "), Some(Starter::Machop));
        assert_eq!(Starter::from_name("Mew"), None);
    }

    #[test]
    fn evolution_lines_clamp_past_final_stage() {
        assert_eq!(Starter::Pichu.species_at(1), Species::PIKACHU);
        assert_eq!(Starter::Pichu.species_at(9), Species::RAICHU);
        assert_eq!(stage_multipliers(7), STAGE_MULTIPLIERS[2]);
    }

    #[test]
    fn spawn_pool_grows_with_cycles() {
        assert_eq!(EnemyKind::spawn_pool(1), vec![EnemyKind::Rattata, EnemyKind::Zubat]);
        assert_eq!(EnemyKind::spawn_pool(4).len(), 5);
        assert!(EnemyKind::spawn_pool(10).iter().all(|k| !k.stats().boss));
    }

    #[test]
    fn bosses_by_cycle() {
        assert_eq!(EnemyKind::boss_for_cycle(4), None);
        assert_eq!(EnemyKind::boss_for_cycle(5), Some(EnemyKind::Onix));
        assert_eq!(EnemyKind::boss_for_cycle(10), Some(EnemyKind::Snorlax));
    }

    #[test]
    fn stage_multipliers_never_weaken() {
        for pair in STAGE_MULTIPLIERS.windows(2) {
            assert!(pair[1].hp >= pair[0].hp);
            assert!(pair[1].damage >= pair[0].damage);
            assert!(pair[1].cooldown <= pair[0].cooldown);
        }
    }

    #[test]
    fn projectile_starters_have_projectiles() {
        for starter in Starter::ALL {
            let stats = starter.base_stats();
            assert_eq!(starter.attack().fires_projectiles(), stats.projectiles > 0);
        }
    }
}
