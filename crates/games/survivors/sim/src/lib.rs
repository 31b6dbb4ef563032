//! Survivors: a tick-driven survival action game.
//!
//! The Ace walks an open arena while enemies close in from every side. Attacks
//! are automatic; the player steers, collects gems and picks upgrades.

pub mod actions;
pub mod assets;
pub mod audio;
pub mod autopilot;
pub mod config;
pub mod data;
pub mod events;
pub mod game;
pub mod observe;
pub mod placeholder;
pub mod save;
pub mod scenes;
pub mod systems;
pub mod upgrades;
pub mod world;

pub use actions::SurvivorsInput;
pub use config::{ConfigError, SurvivorsConfig};
pub use data::{CompanionKind, EnemyKind, Starter};
pub use events::{AttackSource, SurvivorsEvent};
pub use game::SurvivorsGame;
pub use scenes::{App, AppConfig, AppEvent, AppInput, Scene};
pub use survivors_types::{RunOutcome, RunSummary, SurvivorsObservation};
pub use upgrades::Upgrade;
