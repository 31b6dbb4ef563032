use clap::Parser;
use sim_core::Tick;
use sim_host::RunHost;
use sim_survivors::autopilot::{run_with_autopilot, Autopilot};
use sim_survivors::{RunSummary, Starter, SurvivorsConfig, SurvivorsEvent, SurvivorsGame};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "headless_runner")]
#[command(about = "Autopilot balance runs without rendering")]
struct Args {
    /// Pace the run at the configured tick rate instead of as fast as possible.
    #[arg(short, long)]
    realtime: bool,
    #[arg(long, default_value = "12345")]
    seed: u64,
    #[arg(long, value_parser = parse_starter)]
    starter: Option<Starter>,
}

fn parse_starter(name: &str) -> Result<Starter, String> {
    Starter::from_name(name).ok_or_else(|| format!("unknown starter '{}'", name))
}

fn main() {
    let Args {
        realtime,
        seed,
        starter,
    } = Args::parse();

    let mut config = SurvivorsConfig::default();
    if let Some(starter) = starter {
        config.starter = starter;
    }
    // Balance runs should not stall on upgrade menus.
    config.auto_pick_upgrades = !realtime;

    let tick_hz = config.tick_hz;
    let max_ticks = config.tick_limit();
    println!(
        "Starter {} | {} cycles of {} ticks | seed {}",
        config.starter.name(),
        config.cycles_total,
        config.cycle_ticks(),
        seed
    );

    let mut host = RunHost::<SurvivorsGame>::new(config, seed, tick_hz);

    if realtime {
        run_realtime(&mut host, tick_hz, max_ticks);
    } else {
        run_fast(&mut host, max_ticks);
    }
}

fn run_fast(host: &mut RunHost<SurvivorsGame>, max_ticks: Tick) {
    let run = run_with_autopilot(host, max_ticks, |tick, event| print_event(tick, event));

    println!("\n=== Survivors Simulation Complete ===");
    println!("Outcome: {:?}", host.is_terminal());
    println!("Final tick: {}", run.final_tick);
    print_summary(&run.summary);
    print_event_summary(&run.events);
}

fn run_realtime(host: &mut RunHost<SurvivorsGame>, tick_hz: u32, max_ticks: Tick) {
    let tick_duration = Duration::from_secs_f64(1.0 / tick_hz.max(1) as f64);
    let mut last_status = Instant::now();
    let mut all_events = Vec::new();
    let mut pilot = Autopilot::for_config(&host.game().state().config);

    println!("=== Running in Real-Time Mode ({}Hz) ===", tick_hz);
    println!("Press Ctrl+C to stop\n");

    while host.current_tick() < max_ticks {
        let tick_start = Instant::now();

        let obs = host.observe();
        for input in pilot.decide(&obs) {
            host.submit_now(input);
        }

        let Some(events) = host.step_one_tick() else {
            break;
        };

        for event in &events {
            print_event(host.current_tick(), event);
        }
        all_events.extend(events);

        if last_status.elapsed() >= Duration::from_secs(1) {
            print_status(host);
            last_status = Instant::now();
        }

        let elapsed = tick_start.elapsed();
        if elapsed < tick_duration {
            std::thread::sleep(tick_duration - elapsed);
        }
    }

    println!("\n=== Survivors Simulation Complete ===");
    println!("Outcome: {:?}", host.is_terminal());
    println!("Final tick: {}", host.current_tick());
    print_summary(&host.game().summary());
    print_event_summary(&all_events);
}

fn print_event(tick: Tick, event: &SurvivorsEvent) {
    match event {
        SurvivorsEvent::CycleStarted { cycle } => {
            println!("[{:>6}] === Cycle {} started ===", tick, cycle)
        }
        SurvivorsEvent::BossSpawned { kind, .. } => {
            println!("[{:>6}] Boss {} appeared", tick, kind.name())
        }
        SurvivorsEvent::BossDefeated { kind } => {
            println!("[{:>6}] Boss {} defeated", tick, kind.name())
        }
        SurvivorsEvent::UpgradeApplied { upgrade } => {
            println!("[{:>6}] Upgrade: {}", tick, upgrade.label())
        }
        SurvivorsEvent::Evolved { species, stage } => {
            println!("[{:>6}] Evolved into {} (stage {})", tick, species, stage)
        }
        SurvivorsEvent::CompanionRecruited { kind } => {
            println!("[{:>6}] {} joined", tick, kind.name())
        }
        SurvivorsEvent::AceDefeated => println!("[{:>6}] Ace DEFEATED", tick),
        SurvivorsEvent::RunCompleted => println!("[{:>6}] Run completed", tick),
        _ => {}
    }
}

fn print_status(host: &RunHost<SurvivorsGame>) {
    let state = host.game().state();
    println!(
        "  [{:>5.1}s] Cycle {}, Enemies: {}, HP: {:.0}/{:.0}, Level: {}, Kills: {}, Followers: {}+{}",
        state.elapsed_secs(),
        state.cycle,
        state.world.enemies.len(),
        state.ace.hp,
        state.ace_max_hp(),
        state.ace.level,
        state.kills,
        state.world.companions.len(),
        state.world.legion.len()
    );
}

fn print_summary(summary: &RunSummary) {
    println!("Starter: {}", summary.starter);
    println!("Result: {:?}", summary.outcome);
    println!("Survived: {:.1}s (cycle {})", summary.elapsed_secs, summary.cycle);
    println!("Level: {} (stage {})", summary.level, summary.stage);
    println!("Kills: {}", summary.kills);
    println!("Coins: {}", summary.coins_earned);
}

fn print_event_summary(events: &[SurvivorsEvent]) {
    let mut spawned = 0;
    let mut killed = 0;
    let mut hits_taken = 0;
    let mut damage_taken = 0.0f32;
    let mut gems = 0;
    let mut upgrades = 0;
    let mut legion_lost = 0;
    let mut bosses = 0;

    for event in events {
        match event {
            SurvivorsEvent::EnemySpawned { .. } => spawned += 1,
            SurvivorsEvent::EnemyKilled { .. } => killed += 1,
            SurvivorsEvent::AceDamaged { amount, .. } => {
                hits_taken += 1;
                damage_taken += amount;
            }
            SurvivorsEvent::GemCollected { .. } => gems += 1,
            SurvivorsEvent::UpgradeApplied { .. } => upgrades += 1,
            SurvivorsEvent::LegionUnitLost { .. } => legion_lost += 1,
            SurvivorsEvent::BossDefeated { .. } => bosses += 1,
            _ => {}
        }
    }

    println!("\n=== Event Summary ===");
    println!("Enemies spawned: {}", spawned);
    println!("Enemies killed: {}", killed);
    println!("Bosses defeated: {}", bosses);
    println!("Hits taken: {} ({:.0} damage)", hits_taken, damage_taken);
    println!("Gems collected: {}", gems);
    println!("Upgrades taken: {}", upgrades);
    println!("Legion units lost: {}", legion_lost);
}
