//! Persistent profile: coins, unlocked starters, records and settings.

mod migrate;
mod store;

pub use migrate::migrate;
pub use store::{FileStore, KeyValueStore, MemoryStore};

use crate::data::{Starter, UnlockRequirement};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use survivors_types::{RunOutcome, RunSummary};

pub const SAVE_VERSION: u32 = 2;
pub const SAVE_KEY: &str = "survivors-save";

pub(crate) fn default_unlocked() -> Vec<Starter> {
    Starter::ALL
        .into_iter()
        .filter(|s| s.unlock() == UnlockRequirement::Default)
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Records {
    pub best_survival_secs: f32,
    pub max_cycle: u8,
    pub max_kills: u32,
    pub max_level: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub music_volume: f32,
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 0.6,
            sfx_volume: 0.8,
            muted: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveData {
    pub version: u32,
    pub coins: u32,
    pub unlocked: Vec<Starter>,
    pub selected: Starter,
    pub records: Records,
    pub runs_played: u32,
    pub settings: Settings,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            coins: 0,
            unlocked: default_unlocked(),
            selected: Starter::Charmander,
            records: Records::default(),
            runs_played: 0,
            settings: Settings::default(),
        }
    }
}

impl SaveData {
    pub fn is_unlocked(&self, starter: Starter) -> bool {
        self.unlocked.contains(&starter)
    }

    fn grant(&mut self, starter: Starter) {
        if !self.is_unlocked(starter) {
            self.unlocked.push(starter);
            self.unlocked.sort();
        }
    }

    /// Buy a coin-priced starter.
    pub fn try_unlock(&mut self, starter: Starter) -> Result<(), UnlockError> {
        if self.is_unlocked(starter) {
            return Err(UnlockError::AlreadyUnlocked(starter));
        }
        let UnlockRequirement::Coins(price) = starter.unlock() else {
            return Err(UnlockError::NotPurchasable(starter));
        };
        if self.coins < price {
            return Err(UnlockError::InsufficientCoins {
                needed: price,
                have: self.coins,
            });
        }
        self.coins -= price;
        self.grant(starter);
        tracing::info!(starter = starter.name(), price, "starter unlocked");
        Ok(())
    }

    pub fn select(&mut self, starter: Starter) -> Result<(), UnlockError> {
        if !self.is_unlocked(starter) {
            return Err(UnlockError::Locked(starter));
        }
        self.selected = starter;
        Ok(())
    }

    /// Fold a finished run into the profile. Returns starters unlocked by it.
    pub fn record_run(&mut self, summary: &RunSummary) -> Vec<Starter> {
        self.runs_played += 1;
        self.coins = self.coins.saturating_add(summary.coins_earned);
        if summary.outcome == RunOutcome::Survived {
            // Clear bonus.
            self.coins = self.coins.saturating_add(50);
        }

        let records = &mut self.records;
        records.best_survival_secs = records.best_survival_secs.max(summary.elapsed_secs);
        records.max_cycle = records.max_cycle.max(summary.cycle);
        records.max_kills = records.max_kills.max(summary.kills);
        records.max_level = records.max_level.max(summary.level);

        let reached = self.records.max_cycle;
        let newly: Vec<Starter> = Starter::ALL
            .into_iter()
            .filter(|&s| !self.is_unlocked(s))
            .filter(|s| matches!(s.unlock(), UnlockRequirement::ReachCycle(c) if reached >= c))
            .collect();
        for &starter in &newly {
            self.grant(starter);
            tracing::info!(starter = starter.name(), "starter unlocked by progress");
        }
        newly
    }

    /// Clamp values a hand-edited save could have broken.
    fn sanitize(&mut self) {
        for starter in default_unlocked() {
            self.grant(starter);
        }
        self.unlocked.sort();
        self.unlocked.dedup();
        if !self.is_unlocked(self.selected) {
            self.selected = Starter::Charmander;
        }
        let s = &mut self.settings;
        s.music_volume = s.music_volume.clamp(0.0, 1.0);
        s.sfx_volume = s.sfx_volume.clamp(0.0, 1.0);
    }
}

#[derive(Debug)]
pub enum SaveError {
    Store(io::Error),
    Parse(serde_json::Error),
    UnsupportedVersion(u64),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Store(e) => write!(f, "save storage error: {}", e),
            SaveError::Parse(e) => write!(f, "corrupt save data: {}", e),
            SaveError::UnsupportedVersion(v) => write!(
                f,
                "save data version {} is newer than supported version {}",
                v, SAVE_VERSION
            ),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Store(e) => Some(e),
            SaveError::Parse(e) => Some(e),
            SaveError::UnsupportedVersion(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnlockError {
    AlreadyUnlocked(Starter),
    InsufficientCoins { needed: u32, have: u32 },
    /// Unlocked by progress, not coins.
    NotPurchasable(Starter),
    Locked(Starter),
}

impl fmt::Display for UnlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnlockError::AlreadyUnlocked(s) => write!(f, "{} is already unlocked", s.name()),
            UnlockError::InsufficientCoins { needed, have } => {
                write!(f, "need {} coins, have {}", needed, have)
            }
            UnlockError::NotPurchasable(s) => {
                write!(f, "{} cannot be bought with coins", s.name())
            }
            UnlockError::Locked(s) => write!(f, "{} is locked", s.name()),
        }
    }
}

impl std::error::Error for UnlockError {}

/// Loads and stores `SaveData` under a single key.
pub struct SaveManager<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> SaveManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, SAVE_KEY)
    }

    pub fn with_key(store: S, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Missing saves load as the default profile.
    pub fn load(&self) -> Result<SaveData, SaveError> {
        let Some(text) = self.store.get(&self.key).map_err(SaveError::Store)? else {
            return Ok(SaveData::default());
        };
        let raw: serde_json::Value = serde_json::from_str(&text).map_err(SaveError::Parse)?;
        let raw = migrate(raw)?;
        let mut data: SaveData = serde_json::from_value(raw).map_err(SaveError::Parse)?;
        data.version = SAVE_VERSION;
        data.sanitize();
        Ok(data)
    }

    /// Like `load`, but a corrupt or unreadable save starts a fresh profile.
    /// The broken blob is left in place until the next `save`.
    pub fn load_or_default(&self) -> SaveData {
        match self.load() {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load save data, starting fresh");
                SaveData::default()
            }
        }
    }

    pub fn save(&mut self, data: &SaveData) -> Result<(), SaveError> {
        let text = serde_json::to_string_pretty(data).map_err(SaveError::Parse)?;
        self.store.set(&self.key, &text).map_err(SaveError::Store)?;
        tracing::debug!(coins = data.coins, runs = data.runs_played, "save data written");
        Ok(())
    }

    pub fn reset(&mut self) -> Result<SaveData, SaveError> {
        self.store.remove(&self.key).map_err(SaveError::Store)?;
        tracing::info!("save data reset");
        Ok(SaveData::default())
    }
}
