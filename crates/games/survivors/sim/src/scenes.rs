//! Scene flow: Boot, Title, Lobby, Game, Results, back to Title.

use crate::actions::SurvivorsInput;
use crate::assets::{AssetConfig, AssetLoader, AssetManifest, Fetcher, LoadReport};
use crate::audio::{AudioBackend, AudioConfig, AudioManager};
use crate::config::SurvivorsConfig;
use crate::data::Starter;
use crate::events::SurvivorsEvent;
use crate::game::SurvivorsGame;
use crate::save::{KeyValueStore, SaveData, SaveManager, UnlockError};
use serde::Deserialize;
use sim_core::{Game, Micros, Tick};
use sim_host::RunHost;
use survivors_types::{RunOutcome, RunSummary, SurvivorsObservation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scene {
    Boot,
    Title,
    Lobby,
    Game,
    Results,
}

impl Scene {
    pub fn music(self) -> Option<&'static str> {
        match self {
            Scene::Boot => None,
            Scene::Title => Some("title"),
            Scene::Lobby => Some("lobby"),
            Scene::Game => Some("battle"),
            Scene::Results => Some("results"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AppInput {
    Confirm,
    Back,
    Select(Starter),
    Unlock(Starter),
    Play(SurvivorsInput),
}

#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    AssetsLoaded(LoadReport),
    SceneChanged { from: Scene, to: Scene },
    Selected(Starter),
    Unlocked(Starter),
    Rejected(UnlockError),
    RunStarted { starter: Starter, seed: u64 },
    Game(SurvivorsEvent),
    RunRecorded {
        summary: RunSummary,
        newly_unlocked: Vec<Starter>,
    },
    SaveFailed(String),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: SurvivorsConfig,
    pub assets: AssetConfig,
    pub audio: AudioConfig,
    /// Length of the fade between two scenes. Inputs are ignored meanwhile.
    pub transition_ticks: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game: SurvivorsConfig::default(),
            assets: AssetConfig::default(),
            audio: AudioConfig::default(),
            transition_ticks: 30,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Transition {
    to: Scene,
    remaining: u64,
}

pub struct App<S: KeyValueStore, F: Fetcher, B: AudioBackend> {
    config: AppConfig,
    saves: SaveManager<S>,
    save: SaveData,
    loader: AssetLoader<F>,
    audio: AudioManager<B>,
    scene: Scene,
    transition: Option<Transition>,
    run: Option<RunHost<SurvivorsGame>>,
    last_summary: Option<RunSummary>,
    seed: u64,
    runs_started: u64,
}

impl<S: KeyValueStore, F: Fetcher, B: AudioBackend> App<S, F, B> {
    pub fn new(config: AppConfig, saves: SaveManager<S>, fetcher: F, backend: B, seed: u64) -> Self {
        let save = saves.load_or_default();
        let mut audio = AudioManager::new(backend, config.audio.clone());
        audio.apply_settings(&save.settings);
        Self {
            config,
            saves,
            save,
            loader: AssetLoader::new(fetcher),
            audio,
            scene: Scene::Boot,
            transition: None,
            run: None,
            last_summary: None,
            seed,
            runs_started: 0,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn in_transition(&self) -> bool {
        self.transition.is_some()
    }

    pub fn save_data(&self) -> &SaveData {
        &self.save
    }

    pub fn audio(&self) -> &AudioManager<B> {
        &self.audio
    }

    pub fn assets(&self) -> &AssetLoader<F> {
        &self.loader
    }

    pub fn last_summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    pub fn run(&self) -> Option<&RunHost<SurvivorsGame>> {
        self.run.as_ref()
    }

    pub fn observe(&self) -> Option<SurvivorsObservation> {
        self.run.as_ref().map(RunHost::observe)
    }

    fn tick_duration(&self) -> Micros {
        Micros::from_ticks(1, self.config.game.tick_hz.max(1))
    }

    /// Advance the app by one frame.
    pub fn tick(&mut self, inputs: &[AppInput]) -> Vec<AppEvent> {
        let mut events = Vec::new();
        self.audio.update(self.tick_duration());

        if let Some(mut transition) = self.transition.take() {
            if transition.remaining > 1 {
                transition.remaining -= 1;
                self.transition = Some(transition);
            } else {
                self.enter(transition.to, &mut events);
            }
            return events;
        }

        if !inputs.is_empty() {
            // First gesture anywhere lifts the autoplay lock.
            self.audio.unlock();
        }

        match self.scene {
            Scene::Boot => self.tick_boot(&mut events),
            Scene::Title => {
                if inputs.contains(&AppInput::Confirm) {
                    self.audio.play_sfx("menu_confirm");
                    self.begin_transition(Scene::Lobby);
                }
            }
            Scene::Lobby => self.tick_lobby(inputs, &mut events),
            Scene::Game => self.tick_game(inputs, &mut events),
            Scene::Results => {
                if inputs.contains(&AppInput::Confirm) {
                    self.begin_transition(Scene::Title);
                }
            }
        }
        events
    }

    fn begin_transition(&mut self, to: Scene) {
        if let Some(track) = to.music() {
            self.audio.play_music(track);
        }
        self.transition = Some(Transition {
            to,
            remaining: self.config.transition_ticks.max(1),
        });
    }

    fn enter(&mut self, to: Scene, events: &mut Vec<AppEvent>) {
        let from = self.scene;
        self.scene = to;
        if to != Scene::Game {
            self.run = None;
        }
        tracing::info!(?from, ?to, "scene changed");
        events.push(AppEvent::SceneChanged { from, to });
    }

    fn tick_boot(&mut self, events: &mut Vec<AppEvent>) {
        let manifest = AssetManifest::for_roster(&self.config.assets, self.save.selected);
        let report = self.loader.load(&manifest, |progress| {
            tracing::trace!(done = progress.done, total = progress.total, "loading assets");
        });
        events.push(AppEvent::AssetsLoaded(report));
        self.begin_transition(Scene::Title);
    }

    fn persist(&mut self, events: &mut Vec<AppEvent>) {
        if let Err(e) = self.saves.save(&self.save) {
            tracing::warn!(error = %e, "failed to persist save data");
            events.push(AppEvent::SaveFailed(e.to_string()));
        }
    }

    fn tick_lobby(&mut self, inputs: &[AppInput], events: &mut Vec<AppEvent>) {
        for input in inputs {
            match input {
                AppInput::Select(starter) => match self.save.select(*starter) {
                    Ok(()) => {
                        self.audio.play_sfx("menu_move");
                        events.push(AppEvent::Selected(*starter));
                        self.persist(events);
                    }
                    Err(e) => events.push(AppEvent::Rejected(e)),
                },
                AppInput::Unlock(starter) => match self.save.try_unlock(*starter) {
                    Ok(()) => {
                        self.audio.play_sfx("menu_confirm");
                        events.push(AppEvent::Unlocked(*starter));
                        self.persist(events);
                    }
                    Err(e) => events.push(AppEvent::Rejected(e)),
                },
                AppInput::Confirm => {
                    self.start_run(events);
                    return;
                }
                AppInput::Back => {
                    self.begin_transition(Scene::Title);
                    return;
                }
                AppInput::Play(_) => {}
            }
        }
    }

    fn start_run(&mut self, events: &mut Vec<AppEvent>) {
        let starter = self.save.selected;
        let seed = self.seed.wrapping_add(self.runs_started);
        self.runs_started += 1;

        let mut config = self.config.game.clone();
        config.starter = starter;
        let tick_hz = config.tick_hz;
        self.run = Some(RunHost::new(config, seed, tick_hz));
        self.last_summary = None;

        tracing::info!(starter = starter.name(), seed, "run started");
        events.push(AppEvent::RunStarted { starter, seed });
        self.audio.play_sfx("menu_confirm");
        self.begin_transition(Scene::Game);
    }

    fn tick_game(&mut self, inputs: &[AppInput], events: &mut Vec<AppEvent>) {
        let Some(host) = self.run.as_mut() else {
            self.begin_transition(Scene::Title);
            return;
        };

        if inputs.contains(&AppInput::Back) {
            let mut summary = host.game().summary();
            summary.outcome = RunOutcome::Abandoned;
            self.finish_run(summary, events);
            return;
        }

        for input in inputs {
            if let AppInput::Play(payload) = input {
                host.submit_now(payload.clone());
            }
        }

        let Some(game_events) = host.step_one_tick() else {
            return;
        };
        for event in game_events {
            self.audio.handle_event(&event);
            match &event {
                SurvivorsEvent::BossSpawned { .. } => self.audio.play_music("boss"),
                SurvivorsEvent::BossDefeated { .. } => self.audio.play_music("battle"),
                _ => {}
            }
            events.push(AppEvent::Game(event));
        }

        let finished = self
            .run
            .as_ref()
            .filter(|host| host.is_terminal().is_some())
            .map(|host| host.game().summary());
        if let Some(summary) = finished {
            self.finish_run(summary, events);
        }
    }

    fn finish_run(&mut self, summary: RunSummary, events: &mut Vec<AppEvent>) {
        let newly_unlocked = self.save.record_run(&summary);
        tracing::info!(
            outcome = ?summary.outcome,
            kills = summary.kills,
            cycle = summary.cycle,
            "run recorded"
        );
        self.persist(events);
        events.push(AppEvent::RunRecorded {
            summary: summary.clone(),
            newly_unlocked,
        });
        self.last_summary = Some(summary);
        self.begin_transition(Scene::Results);
    }

    /// Current game tick, if a run is active.
    pub fn game_tick(&self) -> Option<Tick> {
        self.run.as_ref().map(RunHost::current_tick)
    }

    pub fn is_run_over(&self) -> bool {
        self.run
            .as_ref()
            .map_or(true, |host| host.game().is_terminal().is_some())
    }
}
