//! Survivors CLI: play a run through the full scene flow, inspect the asset
//! manifest, or manage save data.

use clap::{Parser, Subcommand};
use sim_core::Tick;
use sim_host::RunHost;
use sim_runtime::{spawn_tick_loop, EventCursor, SessionConfig, SessionHandle, SessionStatus};
use sim_survivors::assets::{
    AssetConfig, AssetLoader, AssetManifest, HttpFetcher, LoadedAsset, OfflineFetcher,
};
use sim_survivors::audio::LogBackend;
use sim_survivors::autopilot::Autopilot;
use sim_survivors::save::{FileStore, SaveManager};
use sim_survivors::{
    App, AppConfig, AppEvent, AppInput, RunSummary, Scene, Starter, SurvivorsConfig,
    SurvivorsEvent, SurvivorsGame,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "survivors")]
#[command(about = "Tick-driven survival action game")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play one run with the autopilot and record it in the save file.
    Play {
        /// Starter to select in the lobby (must be unlocked).
        #[arg(long)]
        starter: Option<String>,
        #[arg(long, default_value = "12345")]
        seed: u64,
        #[arg(long, default_value = ".survivors")]
        save_dir: PathBuf,
        /// JSON file overriding game tuning.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Abandon the run after this many game ticks. Defaults to the full
        /// run length plus one second.
        #[arg(long)]
        max_ticks: Option<Tick>,
        /// Run the game at wall-clock speed on the async session runtime.
        #[arg(long)]
        realtime: bool,
        /// Download sprites and audio instead of using placeholders.
        #[arg(long)]
        fetch_assets: bool,
    },
    /// List (and optionally download) the assets a loadout needs.
    Assets {
        #[arg(long, default_value = "Charmander")]
        starter: String,
        #[arg(long)]
        download: Option<PathBuf>,
    },
    /// Inspect or edit save data.
    Save {
        #[command(subcommand)]
        action: SaveAction,
        #[arg(long, default_value = ".survivors", global = true)]
        save_dir: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum SaveAction {
    Show,
    Reset,
    Unlock { starter: String },
}

fn parse_starter(name: &str) -> Result<Starter, String> {
    Starter::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = Starter::ALL.iter().map(|s| s.name()).collect();
        format!("unknown starter '{}', expected one of {}", name, known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Play {
            starter,
            seed,
            save_dir,
            config,
            max_ticks,
            realtime,
            fetch_assets,
        } => {
            let mut game = match config {
                Some(path) => SurvivorsConfig::from_json_file(&path)?,
                None => SurvivorsConfig::default(),
            };
            let starter = starter.as_deref().map(parse_starter).transpose()?;
            let max_ticks = max_ticks.unwrap_or_else(|| game.tick_limit());
            if realtime {
                if let Some(starter) = starter {
                    game.starter = starter;
                }
                play_realtime(game, seed, &save_dir, max_ticks).await?;
            } else {
                let config = AppConfig {
                    game,
                    ..AppConfig::default()
                };
                let saves = SaveManager::new(FileStore::new(&save_dir));
                let summary = if fetch_assets {
                    let app = App::new(config, saves, HttpFetcher, LogBackend, seed);
                    play_scenes(app, starter, max_ticks)?
                } else {
                    let app = App::new(config, saves, OfflineFetcher, LogBackend, seed);
                    play_scenes(app, starter, max_ticks)?
                };
                print_summary(&summary);
            }
        }
        Command::Assets { starter, download } => {
            let starter = parse_starter(&starter)?;
            let config = AssetConfig::default();
            let manifest = AssetManifest::for_roster(&config, starter);
            match download {
                None => {
                    for request in &manifest.requests {
                        println!("{:<28} {}", request.key, request.url);
                    }
                    println!("{} assets", manifest.len());
                }
                Some(dir) => download_assets(&manifest, &dir)?,
            }
        }
        Command::Save { action, save_dir } => {
            let mut saves = SaveManager::new(FileStore::new(&save_dir));
            match action {
                SaveAction::Show => {
                    let data = saves.load()?;
                    println!("{}", serde_json::to_string_pretty(&data)?);
                }
                SaveAction::Reset => {
                    saves.reset()?;
                    println!("Save data reset");
                }
                SaveAction::Unlock { starter } => {
                    let starter = parse_starter(&starter)?;
                    let mut data = saves.load()?;
                    data.try_unlock(starter)?;
                    saves.save(&data)?;
                    println!("Unlocked {} ({} coins left)", starter.name(), data.coins);
                }
            }
        }
    }

    Ok(())
}

/// Drive the scene flow like a player would: confirm through the menus,
/// select the starter and let the autopilot play.
fn play_scenes<S, F, B>(
    mut app: App<S, F, B>,
    starter: Option<Starter>,
    max_ticks: Tick,
) -> Result<RunSummary, Box<dyn std::error::Error>>
where
    S: sim_survivors::save::KeyValueStore,
    F: sim_survivors::assets::Fetcher,
    B: sim_survivors::audio::AudioBackend,
{
    let mut pilot = Autopilot::for_config(&app.config().game);
    let mut selected = false;
    // Menus plus a full run; anything past this is a stuck flow.
    let frame_limit = max_ticks + 10_000;

    for _ in 0..frame_limit {
        let mut inputs = Vec::new();
        if !app.in_transition() {
            match app.scene() {
                Scene::Boot => {}
                Scene::Title => inputs.push(AppInput::Confirm),
                Scene::Lobby => {
                    if let (Some(starter), false) = (starter, selected) {
                        inputs.push(AppInput::Select(starter));
                        selected = true;
                    } else {
                        inputs.push(AppInput::Confirm);
                    }
                }
                Scene::Game => {
                    if app.game_tick().unwrap_or(0) >= max_ticks {
                        tracing::warn!(max_ticks, "tick limit reached, abandoning run");
                        inputs.push(AppInput::Back);
                    } else if let Some(obs) = app.observe() {
                        inputs.extend(pilot.decide(&obs).into_iter().map(AppInput::Play));
                    }
                }
                Scene::Results => {
                    if let Some(summary) = app.last_summary() {
                        return Ok(summary.clone());
                    }
                }
            }
        }

        for event in app.tick(&inputs) {
            match event {
                AppEvent::AssetsLoaded(report) => println!(
                    "Assets: {} loaded, {} placeholders, {} missing",
                    report.loaded,
                    report.placeholders.len(),
                    report.missing.len()
                ),
                AppEvent::Rejected(e) => return Err(e.into()),
                AppEvent::RunStarted { starter, seed } => {
                    println!("Run started: {} (seed {})", starter.name(), seed)
                }
                AppEvent::Game(e) => print_event(app.game_tick().unwrap_or(0), &e),
                AppEvent::RunRecorded { newly_unlocked, .. } => {
                    for starter in newly_unlocked {
                        println!("New starter unlocked: {}", starter.name());
                    }
                }
                AppEvent::SaveFailed(e) => eprintln!("Warning: {}", e),
                AppEvent::SceneChanged { .. }
                | AppEvent::Selected(_)
                | AppEvent::Unlocked(_) => {}
            }
        }
    }

    Err("scene flow did not reach the results screen".into())
}

/// Real-time run on the session runtime: the tick loop runs as its own task
/// while this task steers with the autopilot and streams events.
async fn play_realtime(
    config: SurvivorsConfig,
    seed: u64,
    save_dir: &Path,
    max_ticks: Tick,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut saves = SaveManager::new(FileStore::new(save_dir));
    let mut data = saves.load_or_default();
    data.select(config.starter)?;

    let tick_hz = config.tick_hz;
    let mut pilot = Autopilot::for_config(&config);
    let host = RunHost::<SurvivorsGame>::new(config, seed, tick_hz);
    let session = SessionHandle::from_host(host, SessionConfig::default().event_buffer_capacity);
    let tick_loop = spawn_tick_loop(session.clone());

    println!("=== Running in Real-Time Mode ({}Hz) ===", tick_hz);
    println!("Press Ctrl+C to stop\n");

    let mut cursor = EventCursor(0);
    let mut poll = tokio::time::interval(Duration::from_secs_f64(1.0 / tick_hz.max(1) as f64));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nInterrupted");
                session.terminate().await;
                break;
            }
            _ = poll.tick() => {}
        }

        let (events, next) = session.poll_events(cursor).await;
        cursor = next;
        for sequenced in &events {
            print_event(sequenced.tick, &sequenced.event);
        }

        match session.status().await {
            SessionStatus::Running => {}
            SessionStatus::Paused => continue,
            SessionStatus::Finished(_) | SessionStatus::Terminated => break,
        }
        if session.current_tick().await >= max_ticks {
            session.terminate().await;
            break;
        }

        let obs = session.observe().await;
        for input in pilot.decide(&obs) {
            if session.submit_input(input, obs.tick + 1).await.is_err() {
                break;
            }
        }
    }

    tick_loop.await?;

    let summary = session.with_host(|host| host.game().summary()).await;
    let unlocked = data.record_run(&summary);
    saves.save(&data)?;
    for starter in unlocked {
        println!("New starter unlocked: {}", starter.name());
    }
    print_summary(&summary);
    Ok(())
}

fn download_assets(manifest: &AssetManifest, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut loader = AssetLoader::new(HttpFetcher);
    let report = loader.load(manifest, |progress| {
        if progress.done % 20 == 0 || progress.done == progress.total {
            println!("  {}/{}", progress.done, progress.total);
        }
    });

    let mut written = 0;
    for request in &manifest.requests {
        let Some(LoadedAsset::Bytes(bytes)) = loader.get(&request.key) else {
            continue;
        };
        let extension = request.url.rsplit('.').next().unwrap_or("bin");
        let path = dir.join(format!("{}.{}", request.key, extension));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;
        written += 1;
    }

    println!(
        "Downloaded {} files to {} ({} placeholders, {} missing)",
        written,
        dir.display(),
        report.placeholders.len(),
        report.missing.len()
    );
    Ok(())
}

fn print_event(tick: Tick, event: &SurvivorsEvent) {
    match event {
        SurvivorsEvent::CycleStarted { cycle } => {
            println!("[{:>6}] === Cycle {} started ===", tick, cycle)
        }
        SurvivorsEvent::BossSpawned { kind, .. } => {
            println!("[{:>6}] Boss {} appeared!", tick, kind.name())
        }
        SurvivorsEvent::BossDefeated { kind } => {
            println!("[{:>6}] Boss {} defeated", tick, kind.name())
        }
        SurvivorsEvent::LevelUp { level, choices } => {
            let labels: Vec<String> = choices.iter().map(|u| u.label()).collect();
            println!("[{:>6}] Level {}: {}", tick, level, labels.join(" / "))
        }
        SurvivorsEvent::UpgradeApplied { upgrade } => {
            println!("[{:>6}] Took {}", tick, upgrade.label())
        }
        SurvivorsEvent::Evolved { species, .. } => {
            println!("[{:>6}] Evolved into {}!", tick, species)
        }
        SurvivorsEvent::CompanionRecruited { kind } => {
            println!("[{:>6}] {} joined the team", tick, kind.name())
        }
        SurvivorsEvent::AceDefeated => println!("[{:>6}] The Ace fainted", tick),
        SurvivorsEvent::RunCompleted => println!("[{:>6}] Survived every cycle!", tick),
        SurvivorsEvent::Paused => println!("[{:>6}] Paused", tick),
        SurvivorsEvent::Resumed => println!("[{:>6}] Resumed", tick),
        _ => {}
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\n=== Run Summary ===");
    println!("Starter: {}", summary.starter);
    println!("Outcome: {:?}", summary.outcome);
    println!("Survived: {:.1}s", summary.elapsed_secs);
    println!("Cycle reached: {}", summary.cycle);
    println!("Level: {} (stage {})", summary.level, summary.stage);
    println!("Kills: {}", summary.kills);
    println!("Coins earned: {}", summary.coins_earned);
}
