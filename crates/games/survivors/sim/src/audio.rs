//! Sound effects and music, independent of any audio device.
//!
//! The manager owns voice pools, the autoplay lock and music fades. A device
//! plugs in through [`AudioBackend`].

use crate::data::AttackType;
use crate::events::{AttackSource, SurvivorsEvent};
use crate::save::Settings;
use serde::Deserialize;
use sim_core::Micros;
use std::collections::HashMap;

pub const SFX_KEYS: &[&str] = &[
    "attack_bolt",
    "attack_spread",
    "attack_pierce",
    "attack_aura",
    "attack_melee",
    "enemy_faint",
    "boss_roar",
    "boss_down",
    "hurt",
    "heal",
    "gem",
    "coin",
    "level_up",
    "evolve",
    "recruit",
    "defeat",
    "victory",
    "menu_move",
    "menu_confirm",
];

pub const MUSIC_TRACKS: &[&str] = &["title", "lobby", "battle", "boss", "results"];

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Voice {
    Music,
    Sfx { key: String, slot: usize },
}

pub trait AudioBackend {
    /// Start `sound` on `voice`, replacing whatever that voice was playing.
    fn play(&mut self, voice: &Voice, sound: &str, volume: f32);
    fn stop(&mut self, voice: &Voice);
    fn set_volume(&mut self, voice: &Voice, volume: f32);
}

/// Backend that only logs, for headless play.
#[derive(Clone, Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play(&mut self, voice: &Voice, sound: &str, volume: f32) {
        tracing::trace!(?voice, sound, volume, "audio play");
    }

    fn stop(&mut self, voice: &Voice) {
        tracing::trace!(?voice, "audio stop");
    }

    fn set_volume(&mut self, voice: &Voice, volume: f32) {
        tracing::trace!(?voice, volume, "audio volume");
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AudioCommand {
    Play { voice: Voice, sound: String, volume: f32 },
    Stop { voice: Voice },
    SetVolume { voice: Voice, volume: f32 },
}

/// Backend that records every command.
#[derive(Clone, Debug, Default)]
pub struct RecordingBackend {
    pub commands: Vec<AudioCommand>,
}

impl RecordingBackend {
    pub fn take(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl AudioBackend for RecordingBackend {
    fn play(&mut self, voice: &Voice, sound: &str, volume: f32) {
        self.commands.push(AudioCommand::Play {
            voice: voice.clone(),
            sound: sound.to_string(),
            volume,
        });
    }

    fn stop(&mut self, voice: &Voice) {
        self.commands.push(AudioCommand::Stop {
            voice: voice.clone(),
        });
    }

    fn set_volume(&mut self, voice: &Voice, volume: f32) {
        self.commands.push(AudioCommand::SetVolume {
            voice: voice.clone(),
            volume,
        });
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Voices per sound effect key.
    pub pool_size: usize,
    /// Interval between two volume ramp steps.
    pub fade_step: Micros,
    /// Length of a full fade in or out.
    pub fade_duration: Micros,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            pool_size: 4,
            fade_step: Micros::from_millis(50),
            fade_duration: Micros::from_millis(500),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum MusicPhase {
    Idle,
    FadingIn,
    FadingOut { next: Option<String> },
}

pub struct AudioManager<B: AudioBackend> {
    backend: B,
    config: AudioConfig,
    settings: Settings,
    unlocked: bool,
    next_slot: HashMap<String, usize>,
    music: Option<String>,
    /// Fade position of the current track, `0..=ramp_len()`.
    ramp: u32,
    phase: MusicPhase,
    /// Track requested before the autoplay lock was lifted.
    pending_music: Option<String>,
    since_step: Micros,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B, config: AudioConfig) -> Self {
        Self {
            backend,
            config,
            settings: Settings::default(),
            unlocked: false,
            next_slot: HashMap::new(),
            music: None,
            ramp: 0,
            phase: MusicPhase::Idle,
            pending_music: None,
            since_step: Micros::ZERO,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn current_music(&self) -> Option<&str> {
        self.music.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Lift the autoplay lock after the first user gesture and start any
    /// music requested while locked.
    pub fn unlock(&mut self) {
        if self.unlocked {
            return;
        }
        self.unlocked = true;
        tracing::debug!("audio unlocked");
        if let Some(track) = self.pending_music.take() {
            self.play_music(&track);
        }
    }

    /// Play a sound effect on the next voice of its pool. Returns false when
    /// the request was dropped (locked or muted).
    pub fn play_sfx(&mut self, key: &str) -> bool {
        if !self.unlocked || self.settings.muted {
            return false;
        }
        let pool = self.config.pool_size.max(1);
        let slot = self.next_slot.entry(key.to_string()).or_insert(0);
        let voice = Voice::Sfx {
            key: key.to_string(),
            slot: *slot,
        };
        *slot = (*slot + 1) % pool;
        self.backend.play(&voice, key, self.settings.sfx_volume);
        true
    }

    /// Switch music. The current track fades out before the new one fades in.
    pub fn play_music(&mut self, track: &str) {
        if !self.unlocked {
            self.pending_music = Some(track.to_string());
            return;
        }
        match (&self.music, &self.phase) {
            (Some(current), MusicPhase::FadingOut { .. }) => {
                let next = (current != track).then(|| track.to_string());
                if next.is_none() {
                    // Same track requested again: fade back in.
                    self.phase = MusicPhase::FadingIn;
                } else {
                    self.phase = MusicPhase::FadingOut { next };
                }
            }
            (Some(current), _) if current == track => {}
            (Some(_), _) => {
                self.phase = MusicPhase::FadingOut {
                    next: Some(track.to_string()),
                };
            }
            (None, _) => self.start_track(track),
        }
    }

    pub fn stop_music(&mut self) {
        if !self.unlocked {
            self.pending_music = None;
            return;
        }
        if self.music.is_some() {
            self.phase = MusicPhase::FadingOut { next: None };
        }
    }

    fn start_track(&mut self, track: &str) {
        tracing::debug!(track, "music start");
        self.music = Some(track.to_string());
        self.ramp = 0;
        self.phase = MusicPhase::FadingIn;
        self.backend.play(&Voice::Music, track, 0.0);
    }

    fn ramp_len(&self) -> u32 {
        let step = self.config.fade_step.raw().max(1);
        let steps = (self.config.fade_duration.raw() + step - 1) / step;
        steps.clamp(1, u32::MAX as u64) as u32
    }

    fn music_volume(&self) -> f32 {
        if self.settings.muted {
            0.0
        } else {
            self.ramp as f32 / self.ramp_len() as f32 * self.settings.music_volume
        }
    }

    /// Advance fades by `dt`, in fixed `fade_step` increments.
    pub fn update(&mut self, dt: Micros) {
        let step = self.config.fade_step;
        if step == Micros::ZERO {
            return;
        }
        self.since_step = self.since_step + dt;
        while self.since_step >= step {
            self.since_step = self.since_step.saturating_sub(step);
            self.fade_step();
        }
    }

    fn fade_step(&mut self) {
        let len = self.ramp_len();
        match self.phase.clone() {
            MusicPhase::Idle => {}
            MusicPhase::FadingIn => {
                self.ramp = (self.ramp + 1).min(len);
                if self.ramp == len {
                    self.phase = MusicPhase::Idle;
                }
                self.backend.set_volume(&Voice::Music, self.music_volume());
            }
            MusicPhase::FadingOut { next } => {
                self.ramp = self.ramp.min(len).saturating_sub(1);
                if self.ramp > 0 {
                    self.backend.set_volume(&Voice::Music, self.music_volume());
                    return;
                }
                self.backend.stop(&Voice::Music);
                self.music = None;
                self.phase = MusicPhase::Idle;
                if let Some(track) = next {
                    self.start_track(&track);
                }
            }
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.settings = settings.clone();
        if self.music.is_some() {
            self.backend.set_volume(&Voice::Music, self.music_volume());
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        let mut settings = self.settings.clone();
        settings.muted = muted;
        self.apply_settings(&settings);
    }

    /// Play the sound effect mapped to a gameplay event, if any.
    pub fn handle_event(&mut self, event: &SurvivorsEvent) {
        if let Some(key) = sfx_for_event(event) {
            self.play_sfx(key);
        }
    }
}

/// Sound effect for a gameplay event. Only the Ace's own attacks make noise.
pub fn sfx_for_event(event: &SurvivorsEvent) -> Option<&'static str> {
    let key = match event {
        SurvivorsEvent::AttackFired {
            source: AttackSource::Ace,
            attack,
        } => match attack {
            AttackType::Bolt => "attack_bolt",
            AttackType::Spread => "attack_spread",
            AttackType::Pierce => "attack_pierce",
            AttackType::Aura => "attack_aura",
            AttackType::Melee => "attack_melee",
        },
        SurvivorsEvent::EnemyKilled { .. } => "enemy_faint",
        SurvivorsEvent::BossSpawned { .. } => "boss_roar",
        SurvivorsEvent::BossDefeated { .. } => "boss_down",
        SurvivorsEvent::AceDamaged { .. } => "hurt",
        SurvivorsEvent::AceHealed { .. } => "heal",
        SurvivorsEvent::GemCollected { .. } => "gem",
        SurvivorsEvent::CoinCollected { .. } => "coin",
        SurvivorsEvent::LevelUp { .. } => "level_up",
        SurvivorsEvent::Evolved { .. } => "evolve",
        SurvivorsEvent::CompanionRecruited { .. } => "recruit",
        SurvivorsEvent::AceDefeated => "defeat",
        SurvivorsEvent::RunCompleted => "victory",
        _ => return None,
    };
    Some(key)
}
