use crate::data::Starter;
use serde::Deserialize;
use sim_core::Micros;
use std::fmt;
use std::path::Path;

/// Tuning for a single run. Every field can be overridden from JSON;
/// missing fields keep their defaults.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SurvivorsConfig {
    pub starter: Starter,
    pub tick_hz: u32,

    // Arena
    /// The Ace is clamped to `[-arena_half_extent, arena_half_extent]` on both axes.
    pub arena_half_extent: f32,
    pub ace_radius: f32,

    // Cycles
    pub cycle_length: Micros,
    pub cycles_total: u8,
    /// A boss spawns at the start of every cycle divisible by this.
    pub boss_every: u8,

    // Spawning
    pub spawn_interval_base: Micros,
    pub spawn_interval_decay: f32,
    pub spawn_interval_floor: Micros,
    pub spawn_batch_base: u16,
    /// Cycles per extra enemy in each batch.
    pub spawn_batch_growth_every: u8,
    pub spawn_ring_min: f32,
    pub spawn_ring_max: f32,
    pub max_enemies: usize,
    pub hp_scale_per_cycle: f32,
    pub damage_scale_per_cycle: f32,

    // Enemy behavior pacing
    pub dash_period: Micros,
    pub dash_duration: Micros,
    pub dash_speed_multiplier: f32,
    pub ranged_preferred_distance: f32,
    pub ranged_fire_period: Micros,
    pub hostile_projectile_speed: f32,
    pub boss_volley_period: Micros,
    pub boss_volley_count: u16,

    // Leveling
    pub xp_base: u32,
    pub xp_linear: u32,
    pub xp_quadratic: u32,
    /// Levels at which the Ace evolves to stage 1 and stage 2.
    pub evolution_levels: [u32; 2],
    pub upgrade_choices: usize,
    pub upgrade_stack_cap: u8,
    pub multishot_cap: u8,
    /// Apply the first offered upgrade immediately instead of pausing.
    pub auto_pick_upgrades: bool,

    // Pickups
    pub magnet_radius: f32,
    pub gem_pull_speed: f32,
    pub berry_drop_chance: f32,
    pub berry_heal: f32,
    pub coin_drop_chance: f32,
    pub boss_coin_drop: u32,
    /// Drops past this many gems merge into the nearest gem already down.
    pub max_gems: usize,

    // Damage
    pub invulnerability: Micros,

    // Followers
    pub companion_cap: usize,
    pub companion_spacing: f32,
    pub legion_cap: usize,
    pub legion_orbit_radius: f32,
    pub legion_orbit_growth: f32,
    /// Radians per second.
    pub legion_orbit_speed: f32,
}

impl SurvivorsConfig {
    pub fn duration_to_ticks(&self, d: Micros) -> u64 {
        d.to_ticks(self.tick_hz)
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_hz.max(1) as f32
    }

    pub fn cycle_ticks(&self) -> u64 {
        self.duration_to_ticks(self.cycle_length).max(1)
    }

    pub fn run_ticks(&self) -> u64 {
        self.cycle_ticks() * self.cycles_total as u64
    }

    /// Host ticks after which an unfinished run should be abandoned. A
    /// surviving run completes on the tick after `run_ticks`, so this leaves
    /// one second of slack.
    pub fn tick_limit(&self) -> u64 {
        self.run_ticks() + self.tick_hz as u64
    }

    /// XP needed to go from `level` to `level + 1`.
    pub fn xp_to_next(&self, level: u32) -> u32 {
        let n = level.saturating_sub(1);
        self.xp_base + self.xp_linear * n + self.xp_quadratic * n * n
    }

    pub fn spawn_interval(&self, cycle: u8) -> Micros {
        let steps = cycle.saturating_sub(1) as i32;
        let interval = self
            .spawn_interval_base
            .scale(self.spawn_interval_decay.powi(steps));
        interval.max(self.spawn_interval_floor)
    }

    pub fn spawn_batch(&self, cycle: u8) -> u16 {
        let every = self.spawn_batch_growth_every.max(1);
        self.spawn_batch_base + (cycle.saturating_sub(1) / every) as u16
    }

    pub fn hp_scale(&self, cycle: u8) -> f32 {
        1.0 + self.hp_scale_per_cycle * cycle.saturating_sub(1) as f32
    }

    pub fn damage_scale(&self, cycle: u8) -> f32 {
        1.0 + self.damage_scale_per_cycle * cycle.saturating_sub(1) as f32
    }

    pub fn is_boss_cycle(&self, cycle: u8) -> bool {
        self.boss_every > 0 && cycle > 0 && cycle % self.boss_every == 0
    }

    /// Evolution stage reached at `level`.
    pub fn stage_for_level(&self, level: u32) -> u8 {
        self.evolution_levels
            .iter()
            .filter(|&&threshold| level >= threshold)
            .count() as u8
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_hz == 0 {
            return Err(ConfigError::Invalid("tick_hz must be positive"));
        }
        if self.cycles_total == 0 {
            return Err(ConfigError::Invalid("cycles_total must be positive"));
        }
        if self.spawn_ring_min > self.spawn_ring_max {
            return Err(ConfigError::Invalid("spawn_ring_min exceeds spawn_ring_max"));
        }
        if self.evolution_levels[0] > self.evolution_levels[1] {
            return Err(ConfigError::Invalid("evolution levels must be ascending"));
        }
        if self.upgrade_choices == 0 {
            return Err(ConfigError::Invalid("upgrade_choices must be positive"));
        }
        if self.max_gems == 0 {
            return Err(ConfigError::Invalid("max_gems must be positive"));
        }
        Ok(())
    }

    /// Load overrides from a JSON file on top of the defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: SurvivorsConfig = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for SurvivorsConfig {
    fn default() -> Self {
        Self {
            starter: Starter::Charmander,
            tick_hz: 60,

            arena_half_extent: 2000.0,
            ace_radius: 14.0,

            cycle_length: Micros::from_secs(60),
            cycles_total: 10,
            boss_every: 5,

            spawn_interval_base: Micros::from_millis(1200),
            spawn_interval_decay: 0.85,
            spawn_interval_floor: Micros::from_millis(250),
            spawn_batch_base: 2,
            spawn_batch_growth_every: 2,
            spawn_ring_min: 420.0,
            spawn_ring_max: 620.0,
            max_enemies: 300,
            hp_scale_per_cycle: 0.25,
            damage_scale_per_cycle: 0.1,

            dash_period: Micros::from_secs(3),
            dash_duration: Micros::from_millis(600),
            dash_speed_multiplier: 3.0,
            ranged_preferred_distance: 220.0,
            ranged_fire_period: Micros::from_millis(2500),
            hostile_projectile_speed: 200.0,
            boss_volley_period: Micros::from_secs(4),
            boss_volley_count: 12,

            xp_base: 5,
            xp_linear: 6,
            xp_quadratic: 1,
            evolution_levels: [10, 20],
            upgrade_choices: 3,
            upgrade_stack_cap: 5,
            multishot_cap: 3,
            auto_pick_upgrades: false,

            magnet_radius: 60.0,
            gem_pull_speed: 350.0,
            berry_drop_chance: 0.02,
            berry_heal: 20.0,
            coin_drop_chance: 0.05,
            boss_coin_drop: 25,
            max_gems: 400,

            invulnerability: Micros::from_millis(500),

            companion_cap: 4,
            companion_spacing: 48.0,
            legion_cap: 12,
            legion_orbit_radius: 80.0,
            legion_orbit_growth: 4.0,
            legion_orbit_speed: 2.0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xp_curve() {
        let config = SurvivorsConfig::default();
        assert_eq!(config.xp_to_next(1), 5);
        assert_eq!(config.xp_to_next(2), 12);
        assert_eq!(config.xp_to_next(3), 21);
        assert!(config.xp_to_next(20) > config.xp_to_next(19));
    }

    #[test]
    fn spawn_interval_decays_to_floor() {
        let config = SurvivorsConfig::default();
        assert_eq!(config.spawn_interval(1), Micros::from_millis(1200));
        assert!(config.spawn_interval(2) < config.spawn_interval(1));
        assert_eq!(config.spawn_interval(40), config.spawn_interval_floor);
    }

    #[test]
    fn batches_and_scaling() {
        let config = SurvivorsConfig::default();
        assert_eq!(config.spawn_batch(1), 2);
        assert_eq!(config.spawn_batch(3), 3);
        assert_eq!(config.hp_scale(1), 1.0);
        assert!((config.hp_scale(5) - 2.0).abs() < 1e-6);
        assert!(config.is_boss_cycle(5));
        assert!(!config.is_boss_cycle(4));
        assert!(!config.is_boss_cycle(0));
    }

    #[test]
    fn stages_from_levels() {
        let config = SurvivorsConfig::default();
        assert_eq!(config.stage_for_level(9), 0);
        assert_eq!(config.stage_for_level(10), 1);
        assert_eq!(config.stage_for_level(35), 2);
    }

    #[test]
    fn json_overrides_keep_defaults() {
        let config =
            SurvivorsConfig::from_json_str(r#"{"starter":"Pichu","cycle_length":30,"cycles_total":2}"#)
                .unwrap();
        assert_eq!(config.starter, Starter::Pichu);
        assert_eq!(config.cycle_ticks(), 1800);
        assert_eq!(config.run_ticks(), 3600);
        assert_eq!(config.tick_hz, 60);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let err = SurvivorsConfig::from_json_str(r#"{"tick_hz":0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = SurvivorsConfig::from_json_str(r#"{"max_gems":0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("max_gems must be positive")));
        let err = SurvivorsConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn oversized_durations_are_rejected() {
        let err = SurvivorsConfig::from_json_str(r#"{"cycle_length": 5000}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("exceeds"));

        let config = SurvivorsConfig::from_json_str(r#"{"cycle_length": 4000}"#).unwrap();
        assert_eq!(config.cycle_ticks(), 240_000);
    }
}
