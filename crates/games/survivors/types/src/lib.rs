//! Canonical serializable types for the survivors game.
//!
//! Shared between `sim_survivors` (the simulation) and any frontend that
//! renders observations (sprite renderer, HUD, replay tooling).

use serde::{Deserialize, Serialize};

/// World-space position in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The player-controlled character.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AceInfo {
    pub starter: String,
    /// Current species after evolution (PMD dex number).
    pub dex: u16,
    pub species: String,
    pub position: Point,
    pub facing: Point,
    pub hp: f32,
    pub max_hp: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub stage: u8,
    pub invulnerable: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnemyInfo {
    pub kind: String,
    pub dex: u16,
    pub position: Point,
    pub hp: f32,
    pub max_hp: f32,
    pub boss: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectileInfo {
    pub position: Point,
    pub velocity: Point,
    pub radius: f32,
    pub hostile: bool,
}

/// Something lying on the ground: xp gems, berries, coins.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PickupInfo {
    pub kind: String,
    pub position: Point,
    pub value: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompanionInfo {
    pub kind: String,
    pub dex: u16,
    pub position: Point,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LegionUnitInfo {
    pub position: Point,
    pub hp: f32,
    /// False while the unit is waiting to respawn.
    pub active: bool,
}

/// Choices offered on level-up. The run is frozen until one is picked.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpgradeOfferInfo {
    pub level: u32,
    pub choices: Vec<String>,
}

/// Progress through the timed cycles of a run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CycleInfo {
    /// 1-based; 0 before the first cycle starts.
    pub cycle: u8,
    pub cycles_total: u8,
    pub elapsed_in_cycle_secs: f32,
    pub cycle_length_secs: f32,
    pub boss_alive: bool,
}

/// Full game state observation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurvivorsObservation {
    pub tick: u64,
    pub ticks_per_second: u32,
    pub elapsed_secs: f32,
    pub paused: bool,

    pub cycle: CycleInfo,
    pub ace: AceInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<UpgradeOfferInfo>,

    pub kills: u32,
    pub coins_earned: u32,

    pub enemies: Vec<EnemyInfo>,
    pub projectiles: Vec<ProjectileInfo>,
    pub pickups: Vec<PickupInfo>,
    pub companions: Vec<CompanionInfo>,
    pub legion: Vec<LegionUnitInfo>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Survived every cycle.
    Survived,
    Defeated,
    /// Left before the run ended.
    Abandoned,
}

/// End-of-run results shown on the results screen and fed into save data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub starter: String,
    pub outcome: RunOutcome,
    pub elapsed_secs: f32,
    /// Highest cycle reached (1-based).
    pub cycle: u8,
    pub level: u32,
    pub kills: u32,
    pub coins_earned: u32,
    pub stage: u8,
}
