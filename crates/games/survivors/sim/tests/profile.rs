use sim_core::Micros;
use sim_survivors::assets::OfflineFetcher;
use sim_survivors::audio::{AudioCommand, RecordingBackend, Voice};
use sim_survivors::save::{FileStore, KeyValueStore, SaveManager, SAVE_KEY, SAVE_VERSION};
use sim_survivors::{App, AppConfig, AppEvent, AppInput, Scene, Starter, SurvivorsConfig};

type FileApp = App<FileStore, OfflineFetcher, RecordingBackend>;

fn quick_config() -> AppConfig {
    AppConfig {
        game: SurvivorsConfig {
            cycle_length: Micros::from_secs(2),
            cycles_total: 1,
            auto_pick_upgrades: true,
            ..SurvivorsConfig::default()
        },
        transition_ticks: 2,
        ..AppConfig::default()
    }
}

fn open(dir: &std::path::Path) -> FileApp {
    App::new(
        quick_config(),
        SaveManager::new(FileStore::new(dir)),
        OfflineFetcher,
        RecordingBackend::default(),
        11,
    )
}

/// Tick with no input until any scene transition completes.
fn settle(app: &mut FileApp, events: &mut Vec<AppEvent>) {
    for _ in 0..50 {
        events.extend(app.tick(&[]));
        if !app.in_transition() {
            return;
        }
    }
    panic!("transition never finished");
}

#[test]
fn full_run_is_persisted_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open(dir.path());
    let mut events = Vec::new();

    events.extend(app.tick(&[]));
    settle(&mut app, &mut events);
    assert_eq!(app.scene(), Scene::Title);

    events.extend(app.tick(&[AppInput::Confirm]));
    settle(&mut app, &mut events);
    events.extend(app.tick(&[AppInput::Select(Starter::Squirtle)]));
    events.extend(app.tick(&[AppInput::Confirm]));
    settle(&mut app, &mut events);
    assert_eq!(app.scene(), Scene::Game);

    for _ in 0..400 {
        if app.is_run_over() {
            break;
        }
        events.extend(app.tick(&[]));
    }
    settle(&mut app, &mut events);
    assert_eq!(app.scene(), Scene::Results);

    let summary = app.last_summary().cloned().unwrap();
    assert_eq!(summary.starter, "Squirtle");
    assert!(events
        .iter()
        .any(|e| matches!(e, AppEvent::RunRecorded { .. })));
    assert!(!events.iter().any(|e| matches!(e, AppEvent::SaveFailed(_))));
    assert!(dir.path().join(format!("{}.json", SAVE_KEY)).exists());

    // A fresh app sees the recorded run.
    let reopened = open(dir.path());
    let data = reopened.save_data();
    assert_eq!(data.version, SAVE_VERSION);
    assert_eq!(data.runs_played, 1);
    assert_eq!(data.selected, Starter::Squirtle);
    assert_eq!(data.records.max_cycle, summary.cycle);
    assert_eq!(data.coins, app.save_data().coins);
}

#[test]
fn legacy_save_on_disk_is_migrated() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    store
        .set(
            SAVE_KEY,
            r#"{"gold": 400, "unlocked": ["Charmander"], "bestTime": 95.5, "musicVolume": 2.0, "muted": true}"#,
        )
        .unwrap();

    let mut saves = SaveManager::new(store);
    let mut data = saves.load().unwrap();
    assert_eq!(data.coins, 400);
    assert_eq!(data.records.best_survival_secs, 95.5);
    assert_eq!(data.settings.music_volume, 1.0);
    assert!(data.settings.muted);

    data.try_unlock(Starter::Pichu).unwrap();
    saves.save(&data).unwrap();

    let text = saves.store().get(SAVE_KEY).unwrap().unwrap();
    assert!(text.contains("\"version\": 2"));
    let reloaded = saves.load().unwrap();
    assert!(reloaded.is_unlocked(Starter::Pichu));
    assert_eq!(reloaded.coins, 100);
}

#[test]
fn corrupt_save_starts_a_fresh_profile() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    store.set(SAVE_KEY, "{ truncated").unwrap();

    let app = open(dir.path());
    assert_eq!(app.save_data().runs_played, 0);
    assert_eq!(app.save_data().selected, Starter::Charmander);
}

#[test]
fn muted_profile_keeps_menus_silent() {
    let dir = tempfile::tempdir().unwrap();
    let mut saves = SaveManager::new(FileStore::new(dir.path()));
    let mut data = saves.load().unwrap();
    data.settings.muted = true;
    saves.save(&data).unwrap();

    let mut app = open(dir.path());
    let mut events = Vec::new();
    events.extend(app.tick(&[]));
    settle(&mut app, &mut events);
    events.extend(app.tick(&[AppInput::Confirm]));
    settle(&mut app, &mut events);
    assert_eq!(app.scene(), Scene::Lobby);

    let sfx_played = app.audio().backend().commands.iter().any(|c| {
        matches!(
            c,
            AudioCommand::Play {
                voice: Voice::Sfx { .. },
                ..
            }
        )
    });
    assert!(!sfx_played);
}
