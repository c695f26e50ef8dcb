//! Skybound - headless runner
//!
//! Plays levels on autopilot against a real save directory. Rendering and
//! real input live in a host front end; this binary drives the same
//! session loop with a simulated 60 Hz frame clock.

use std::env;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use skybound::audio::{AudioManager, LogSink};
use skybound::clock::FixedClock;
use skybound::input::{InputSnapshot, InputState};
use skybound::sim::LevelOutcome;
use skybound::{SaveStore, Screen, Session, Settings};

/// Host frame length being simulated
const FRAME_DT: f32 = 1.0 / 60.0;

fn save_dir() -> PathBuf {
    env::var("SKYBOUND_SAVE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./saves"))
}

fn run_seed() -> u64 {
    env::var("SKYBOUND_SEED")
        .ok()
        .and_then(|v| parse_seed(&v))
        .unwrap_or_else(clock_seed)
}

/// Tick budget for the whole run
fn max_ticks() -> u64 {
    env::var("SKYBOUND_MAX_TICKS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60_000)
}

/// Decimal or `0x` hex
fn parse_seed(s: &str) -> Option<u64> {
    match s.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}

fn main() {
    env_logger::init();

    let dir = save_dir();
    let seed = run_seed();
    let budget = max_ticks();
    log::info!(
        "Skybound (headless) starting: saves in {}, seed {seed:#x}, {budget} ticks",
        dir.display()
    );

    let store = SaveStore::open(&dir);
    let settings = Settings::load(&dir);
    let audio = AudioManager::new(Box::new(LogSink));
    let mut session = Session::new(store, settings, audio, seed);

    let mut input = InputState::new();
    input.autopilot = true;
    let mut clock = FixedClock::new();

    let mut ticks = 0u64;
    let mut completed = 0u32;
    let mut deaths = 0u32;

    session.open_start_screen();
    session.start_game();

    while ticks < budget {
        input.update(InputSnapshot::default());
        for _ in 0..clock.advance(FRAME_DT) {
            session.step(&input.tick_input());
            ticks += 1;
        }

        for unlocked in session.take_notifications() {
            println!("Achievement unlocked: {} (+{} coins)", unlocked.name, unlocked.reward);
        }

        match session.screen() {
            Screen::Game => {}
            Screen::Paused => session.resume(),
            Screen::GameOver | Screen::NewHighscore => {
                if let Some(summary) = session.last_summary() {
                    println!(
                        "Level {}: {:?} after {:.1}s{}",
                        summary.level,
                        summary.outcome,
                        summary.elapsed_secs,
                        if summary.damage_taken { "" } else { " (no damage)" }
                    );
                    match summary.outcome {
                        LevelOutcome::Completed => completed += 1,
                        _ => deaths += 1,
                    }
                }
                session.acknowledge();
                session.start_game();
            }
            Screen::MainMenu | Screen::StartScreen => session.start_game(),
            Screen::Exit => break,
        }
    }

    if let Some(state) = session.level() {
        println!(
            "Budget spent on level {} ({} ticks in)",
            state.level, state.tick_count
        );
    }
    let store = session.store();
    println!(
        "Done: {completed} levels cleared, {deaths} deaths, high score {}, {} coins, {}% achievements",
        store.high_score(),
        store.coins(),
        session.achievements().completion_percentage()
    );

    session.settings().save(&dir);
    session.exit();
}
