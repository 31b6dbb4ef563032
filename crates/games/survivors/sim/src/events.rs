use crate::data::{AttackType, CompanionKind, EnemyKind};
use crate::upgrades::Upgrade;
use crate::world::EnemyId;

/// Who dealt damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackSource {
    Ace,
    Companion(CompanionKind),
    Legion,
    Enemy(EnemyKind),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SurvivorsEvent {
    CycleStarted {
        cycle: u8,
    },
    EnemySpawned {
        id: EnemyId,
        kind: EnemyKind,
    },
    BossSpawned {
        id: EnemyId,
        kind: EnemyKind,
    },
    AttackFired {
        source: AttackSource,
        attack: AttackType,
    },
    EnemyKilled {
        id: EnemyId,
        kind: EnemyKind,
        x: f32,
        y: f32,
        by: Option<AttackSource>,
    },
    BossDefeated {
        kind: EnemyKind,
    },
    AceDamaged {
        amount: f32,
        hp: f32,
        by: AttackSource,
    },
    AceHealed {
        amount: f32,
        hp: f32,
    },
    GemCollected {
        xp: u32,
    },
    CoinCollected {
        coins: u32,
    },
    LevelUp {
        level: u32,
        choices: Vec<Upgrade>,
    },
    UpgradeApplied {
        upgrade: Upgrade,
    },
    Evolved {
        stage: u8,
        species: &'static str,
    },
    CompanionRecruited {
        kind: CompanionKind,
    },
    LegionUnitLost {
        index: usize,
    },
    LegionUnitRestored {
        index: usize,
    },
    Paused,
    Resumed,
    AceDefeated,
    RunCompleted,
}
