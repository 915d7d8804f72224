//! War Arena - headless runner
//!
//! Plays runs with the demo autopilot (or scripted idle input), logging
//! progress and persisting results to the configured data directory.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;

use war_arena::Settings;
use war_arena::audio::{AudioManager, LogAudioSink};
use war_arena::game::{FrameStatus, Game};
use war_arena::persistence::JsonStore;
use war_arena::platform::ScriptedInput;
use war_arena::renderer::LogRenderSink;
use war_arena::session::Session;

#[derive(Parser, Debug)]
#[command(name = "war-arena")]
#[command(about = "Headless runner for the War Arena simulation")]
struct Cli {
    /// Settings file (JSON); defaults are used if it is missing
    #[arg(long, default_value = "war_arena_settings.json")]
    config: PathBuf,
    /// Play as this user (guest if omitted)
    #[arg(long)]
    user: Option<String>,
    /// Name to record if a guest run reaches the leaderboard
    #[arg(long)]
    name: Option<String>,
    /// Wall-clock limit for the run, in seconds
    #[arg(long, default_value_t = 60)]
    seconds: u64,
    /// RNG seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Let the demo AI play
    #[arg(long)]
    autopilot: bool,
    /// Run as fast as possible instead of in real time
    #[arg(long)]
    fast: bool,
}

fn entropy_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5eed)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = Settings::load(&cli.config);
    std::fs::create_dir_all(&settings.data_dir)
        .with_context(|| format!("creating data directory {}", settings.data_dir.display()))?;

    let seed = cli.seed.unwrap_or_else(entropy_seed);
    log::info!("War Arena (headless) starting, seed {seed}");

    let store = JsonStore::new(&settings.data_dir);
    let mut session = Session::new(Box::new(store.clone()), Box::new(store), seed);
    if let Some(user) = &cli.user {
        session.login(user);
    }

    let audio = AudioManager::new(Some(Box::new(LogAudioSink)));
    let mut game = Game::new(
        settings,
        session,
        Box::new(ScriptedInput::default()),
        Box::new(LogRenderSink::default()),
        audio,
        seed,
    );
    game.set_autopilot(cli.autopilot);
    game.start_run();

    let step = Duration::from_secs_f32(game.settings.sim_dt());
    let deadline = Duration::from_secs(cli.seconds);
    let started = Instant::now();
    let mut last = Instant::now();
    let mut sim_elapsed = Duration::ZERO;

    loop {
        let frame_dt = if cli.fast {
            step
        } else {
            thread::sleep(step.saturating_sub(last.elapsed()));
            last.elapsed()
        };
        last = Instant::now();

        let elapsed = if cli.fast { sim_elapsed } else { started.elapsed() };
        if elapsed >= deadline {
            log::info!("Time limit reached, leaving the arena");
            game.abort_run();
            break;
        }
        sim_elapsed += step;

        match game.frame(frame_dt.as_secs_f32()) {
            FrameStatus::Running | FrameStatus::Idle => {}
            FrameStatus::Quit => break,
            FrameStatus::Finished(summary) => {
                println!(
                    "{}: score {} kills {} (+{} coins)",
                    if summary.won { "Victory" } else { "Game over" },
                    summary.score,
                    summary.kills,
                    summary.coins_earned
                );
                if summary.awaiting_name {
                    let name = cli.name.as_deref().unwrap_or_default();
                    if let Some(rank) = game.session.submit_guest_name(name) {
                        println!("Leaderboard rank #{rank}");
                    }
                } else if let Some(rank) = summary.rank {
                    println!("Leaderboard rank #{rank}");
                }
                break;
            }
        }
    }

    println!("Coins: {}", game.session.ctx.coins());
    for (i, entry) in game.session.ctx.leaderboard.entries.iter().enumerate() {
        println!("{:>2}. {:<12} S:{}  K:{}", i + 1, entry.name, entry.score, entry.kills);
    }
    Ok(())
}
