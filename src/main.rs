//! Frame Breaker entry point
//!
//! Runs a headless game driven by an autopilot. The first argument is an
//! optional settings file (default `frame-breaker.json`); `RUST_LOG` controls
//! verbosity.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use frame_breaker::consts::*;
use frame_breaker::highscores::JsonFileStore;
use frame_breaker::layout::{BrickLayout, DirectoryLevels, FallbackLevels, LevelProvider};
use frame_breaker::sim::{BrickColor, GamePhase, GameState};
use frame_breaker::submission::OfflineSubmitter;
use frame_breaker::{LayoutError, Session, Settings};

/// Levels from a directory when configured, generated otherwise
enum Levels {
    Directory(DirectoryLevels),
    Generated(FallbackLevels),
}

impl LevelProvider for Levels {
    async fn generate_level(&self, level: u32) -> Result<BrickLayout, LayoutError> {
        match self {
            Levels::Directory(dir) => dir.generate_level(level).await,
            Levels::Generated(generated) => generated.generate_level(level).await,
        }
    }
}

/// Where the autopilot wants the paddle, and whether to launch
fn autopilot(state: &GameState, frame: u64) -> (f32, bool) {
    let ball = &state.ball;
    if ball.attached {
        // Serve from a different spot each time
        let x = CANVAS_WIDTH / 2.0 + (frame as f32 * 0.05).sin() * 250.0;
        return (x, (state.paddle.center_x() - x).abs() < 20.0);
    }

    // Ball high and rising: go grab the nearest helpful pickup
    let ball_is_safe = ball.vel.y < 0.0 && ball.pos.y < CANVAS_HEIGHT / 2.0;
    let pickup = state
        .power_ups
        .iter()
        .filter(|p| !p.kind.is_power_down())
        .max_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal));
    if let (true, Some(p)) = (ball_is_safe, pickup) {
        return (p.pos.x, false);
    }

    // Lead the ball slightly, with a wobble so rallies do not loop forever
    let offset = (frame as f32 * 0.01).sin() * state.paddle.width * 0.3;
    (ball.pos.x + ball.vel.x * 4.0 + offset, false)
}

/// Paint target: the color with the most visible bricks
fn most_common_color(state: &GameState) -> BrickColor {
    let mut counts: HashMap<BrickColor, usize> = HashMap::new();
    for brick in state.bricks.iter().filter(|b| b.visible) {
        *counts.entry(brick.original_color).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(color, n)| (n, std::cmp::Reverse(color.hex())))
        .map(|(color, _)| color)
        .unwrap_or(BrickColor::Magenta)
}

fn wall_clock_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("frame-breaker.json"));
    let settings = Settings::load(&config_path);
    log::info!("Frame Breaker (headless) starting...");

    let levels = match &settings.levels_dir {
        Some(dir) => Levels::Directory(DirectoryLevels::new(dir)),
        None => Levels::Generated(FallbackLevels),
    };
    let store = JsonFileStore::new(&settings.leaderboard_path);
    let mut session = Session::new(settings.clone(), levels, store, OfflineSubmitter);

    let mut ticker = settings.realtime.then(|| {
        let mut interval = tokio::time::interval(Duration::from_millis(FRAME_MS));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    });

    session.start_game().await;

    // Simulation clock; advances one frame per step whether or not we pace
    let mut now = 0u64;
    for frame in 0..settings.max_frames {
        if let Some(ticker) = ticker.as_mut() {
            ticker.tick().await;
        }
        now += FRAME_MS;

        match session.phase() {
            GamePhase::Playing => {
                let (x, launch) = autopilot(&session.state, frame);
                session.pointer_moved(x);
                if launch {
                    session.primary_action();
                }
            }
            GamePhase::ColorPicker => {
                let color = most_common_color(&session.state);
                session.select_color(color, now);
            }
            GamePhase::Loading => session.load_level().await,
            GamePhase::GameOver => break,
            _ => {}
        }

        for event in session.frame(now) {
            log::trace!("{:?}", event);
        }
    }

    let stats = session.state.stats;
    println!(
        "Game finished on level {} with score {} ({:?})",
        stats.level,
        stats.score,
        session.phase()
    );

    if session.phase() == GamePhase::GameOver {
        match session.submit_score("CPU", false, wall_clock_ms()).await {
            Ok(report) => {
                if let Some(notice) = report.notice {
                    println!("{}", notice);
                }
                match report.rank {
                    Some(rank) => println!("New high score! Rank #{}", rank),
                    None => println!("Score did not make the leaderboard"),
                }
            }
            Err(e) => log::error!("Could not record score: {}", e),
        }
    }

    println!("\nLeaderboard:");
    for (i, entry) in session.leaderboard(MAX_HIGH_SCORES).iter().enumerate() {
        println!("{:>2}. {:<8} {:>8}", i + 1, entry.name, entry.score);
    }
}
