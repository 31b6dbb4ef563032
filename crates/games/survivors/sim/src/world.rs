use crate::config::SurvivorsConfig;
use crate::data::{
    stage_multipliers, AttackType, CompanionKind, EnemyKind, Starter, StatBlock, LEGION,
};
use crate::events::AttackSource;
use crate::upgrades::{UpgradeOffer, UpgradeStacks};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use slotmap::{new_key_type, SlotMap};

new_key_type! { pub struct EnemyId; }
new_key_type! { pub struct ProjectileId; }
new_key_type! { pub struct PickupId; }
new_key_type! { pub struct CompanionId; }

/// Simulation clock in ticks. Unlike the host tick it stops while the run is
/// paused, so every timer below is expressed in clock ticks.
pub type Clock = u64;

#[derive(Clone, Debug)]
pub struct Ace {
    pub starter: Starter,
    pub stage: u8,
    pub pos: Vec2,
    /// Unit vector; last non-zero movement direction.
    pub facing: Vec2,
    /// Requested movement direction, length <= 1.
    pub move_dir: Vec2,
    pub hp: f32,
    pub level: u32,
    pub xp: u32,
    /// Level-ups not yet turned into an upgrade offer.
    pub pending_levels: u32,
    pub invulnerable_until: Clock,
    pub next_attack: Clock,
}

impl Ace {
    pub fn new(starter: Starter) -> Self {
        Self {
            starter,
            stage: 0,
            pos: Vec2::ZERO,
            facing: Vec2::X,
            move_dir: Vec2::ZERO,
            hp: starter.base_stats().max_hp,
            level: 1,
            xp: 0,
            pending_levels: 0,
            invulnerable_until: 0,
            next_attack: 0,
        }
    }

    pub fn attack(&self) -> AttackType {
        self.starter.attack()
    }
}

/// Per-behavior timers and scratch state.
#[derive(Clone, Debug, Default)]
pub struct EnemyBrain {
    /// Swarm weave phase offset in radians.
    pub phase: f32,
    /// Next dash / shot / volley.
    pub next_action: Clock,
    pub dash_until: Clock,
    pub dash_dir: Vec2,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub radius: f32,
    pub brain: EnemyBrain,
    pub last_hit_by: Option<AttackSource>,
}

impl Enemy {
    pub fn is_boss(&self) -> bool {
        self.kind.stats().boss
    }
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Additional enemies this projectile may pass through.
    pub pierce_left: u8,
    pub expires_at: Clock,
    pub hostile: bool,
    pub source: AttackSource,
    /// Enemies already hit, so piercing shots damage each enemy once.
    pub hit: Vec<EnemyId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupKind {
    Gem,
    Berry,
    Coin,
}

impl PickupKind {
    pub fn name(self) -> &'static str {
        match self {
            PickupKind::Gem => "Gem",
            PickupKind::Berry => "Berry",
            PickupKind::Coin => "Coin",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Pickup {
    pub kind: PickupKind,
    pub pos: Vec2,
    /// XP for gems, hp for berries, coins for coins.
    pub value: u32,
}

#[derive(Clone, Debug)]
pub struct Companion {
    pub kind: CompanionKind,
    pub pos: Vec2,
    pub slot: usize,
    pub next_attack: Clock,
}

#[derive(Clone, Debug)]
pub struct LegionUnit {
    pub pos: Vec2,
    pub hp: f32,
    pub respawn_at: Option<Clock>,
    /// (enemy, clock at which this unit may hit it again)
    pub hit_cooldowns: Vec<(EnemyId, Clock)>,
}

impl LegionUnit {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            hp: LEGION.max_hp,
            respawn_at: None,
            hit_cooldowns: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.respawn_at.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct World {
    pub enemies: SlotMap<EnemyId, Enemy>,
    pub projectiles: SlotMap<ProjectileId, Projectile>,
    pub pickups: SlotMap<PickupId, Pickup>,
    pub companions: SlotMap<CompanionId, Companion>,
    pub legion: Vec<LegionUnit>,
}

impl World {
    pub fn new() -> Self {
        Self {
            enemies: SlotMap::with_key(),
            projectiles: SlotMap::with_key(),
            pickups: SlotMap::with_key(),
            companions: SlotMap::with_key(),
            legion: Vec::new(),
        }
    }

    pub fn boss_alive(&self) -> bool {
        self.enemies.values().any(Enemy::is_boss)
    }

    pub fn has_companion(&self, kind: CompanionKind) -> bool {
        self.companions.values().any(|c| c.kind == kind)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct SurvivorsState {
    pub config: SurvivorsConfig,
    pub rng: StdRng,
    /// Ticks of unpaused simulation.
    pub clock: Clock,
    pub cycle: u8,
    pub next_spawn: Clock,
    pub ace: Ace,
    pub world: World,
    pub upgrades: UpgradeStacks,
    pub offer: Option<UpgradeOffer>,
    pub paused: bool,
    pub kills: u32,
    pub coins_earned: u32,
    pub defeated: bool,
    pub completed: bool,
}

impl SurvivorsState {
    pub fn new(config: SurvivorsConfig, seed: u64) -> Self {
        let ace = Ace::new(config.starter);
        Self {
            rng: StdRng::seed_from_u64(seed),
            clock: 0,
            cycle: 0,
            next_spawn: 0,
            ace,
            world: World::new(),
            upgrades: UpgradeStacks::default(),
            offer: None,
            paused: false,
            kills: 0,
            coins_earned: 0,
            defeated: false,
            completed: false,
            config,
        }
    }

    /// Ace stats after evolution stage and upgrades.
    pub fn ace_stats(&self) -> StatBlock {
        let base = self.ace.starter.base_stats();
        let stage = stage_multipliers(self.ace.stage);
        let up = &self.upgrades;
        let projectiles = if self.ace.attack().fires_projectiles() {
            base.projectiles + up.multishot
        } else {
            0
        };
        StatBlock {
            max_hp: (base.max_hp + 20.0 * up.vitality as f32) * stage.hp,
            move_speed: base.move_speed * stage.speed * (1.0 + 0.08 * up.swiftness as f32),
            damage: base.damage * stage.damage * (1.0 + 0.15 * up.damage as f32),
            cooldown: base
                .cooldown
                .scale(stage.cooldown * 0.92f32.powi(up.haste as i32)),
            range: base.range * stage.range,
            projectile_speed: base.projectile_speed,
            projectiles,
            pierce: base.pierce,
            area: if base.projectiles > 0 {
                base.area
            } else {
                base.area * stage.range
            },
        }
    }

    pub fn ace_max_hp(&self) -> f32 {
        self.ace_stats().max_hp
    }

    pub fn ace_radius(&self) -> f32 {
        self.config.ace_radius * stage_multipliers(self.ace.stage).size
    }

    pub fn magnet_radius(&self) -> f32 {
        self.config.magnet_radius * (1.0 + 0.25 * self.upgrades.magnet as f32)
    }

    pub fn companion_stats(&self, kind: CompanionKind) -> StatBlock {
        let mut stats = kind.stats();
        stats.damage *= 1.0 + 0.2 * self.upgrades.companion_power as f32;
        stats
    }

    pub fn legion_damage(&self) -> f32 {
        LEGION.contact_damage * (1.0 + 0.2 * self.upgrades.legion_power as f32)
    }

    pub fn legion_orbit_radius(&self) -> f32 {
        self.config.legion_orbit_radius
            + self.config.legion_orbit_growth * self.world.legion.len() as f32
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.clock as f32 * self.config.dt()
    }

    /// Frozen for menus or an unanswered upgrade offer.
    pub fn is_frozen(&self) -> bool {
        self.paused || (self.offer.is_some() && !self.config.auto_pick_upgrades)
    }
}
