//! Frame Breaker - A neon brick-breaker arcade game
//!
//! Core modules:
//! - `sim`: Frame simulation (physics, collisions, power-ups, game phases)
//! - `layout`: Brick layouts and level providers
//! - `highscores`: Leaderboard table and score persistence
//! - `submission`: Remote score submission and name validation
//! - `session`: Driver that owns the state and the injected collaborators
//! - `settings`: Configuration and gameplay tuning

pub mod error;
pub mod highscores;
pub mod layout;
pub mod session;
pub mod settings;
pub mod sim;
pub mod submission;

pub use error::{LayoutError, NameError, StoreError, SubmitError};
pub use highscores::{HighScores, LeaderboardEntry, ScoreStore};
pub use session::Session;
pub use settings::{Settings, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Play field dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH_DEFAULT: f32 = 120.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    pub const PADDLE_Y: f32 = CANVAS_HEIGHT - 40.0;
    /// Keyboard nudge distance per frame
    pub const PADDLE_SPEED: f32 = 8.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    pub const BALL_START_VELOCITY: Vec2 = Vec2::new(4.0, -4.0);
    /// Speed boost while invincible (multiplicative)
    pub const INVINCIBLE_SPEED_MULTIPLIER: f32 = 1.2;
    /// Horizontal speed at the very edge of the paddle
    pub const MAX_DEFLECTION: f32 = 6.0;

    /// Brick grid
    pub const BRICK_COLS: usize = 18;
    pub const BRICK_ROWS: usize = 10;
    pub const BRICK_HEIGHT: f32 = 18.0;
    pub const BRICK_GAP: f32 = 3.0;
    pub const BRICK_TOP_OFFSET: f32 = 50.0;
    pub const BRICK_WIDTH: f32 =
        (CANVAS_WIDTH - BRICK_GAP * (BRICK_COLS as f32 + 1.0)) / BRICK_COLS as f32;
    pub const BRICK_HP_DEFAULT: u32 = 2;

    /// Session defaults
    pub const INITIAL_LIVES: u32 = 3;
    pub const POINTS_PER_BRICK: u64 = 10;
    pub const TARGET_FPS: u32 = 60;
    pub const FRAME_MS: u64 = 1000 / TARGET_FPS as u64;

    /// Power-ups
    pub const POWER_UP_CHANCE: f64 = 0.15;
    pub const POWER_UP_SIZE: f32 = 15.0;
    /// Fall distance per frame
    pub const POWER_UP_SPEED: f32 = 2.0;
    pub const STICKY_CHARGES: u32 = 3;
    pub const SHRINK_DURATION_MS: u64 = 20_000;
    pub const INVINCIBLE_DURATION_MS: u64 = 7_000;
    pub const SHRINK_FACTOR: f32 = 0.5;
    /// Share of the visible bricks an add-bricks pickup refills, in percent
    pub const ADD_BRICKS_PERCENT: usize = 15;

    /// Delay between clearing a level and loading the next one
    pub const LEVEL_COMPLETE_DELAY_MS: u64 = 2_000;

    /// Leaderboard size
    pub const MAX_HIGH_SCORES: usize = 10;
}

/// Clamp `v` into `[lo, hi]`
#[inline]
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unit vector in the direction of `v`, or zero for a zero vector
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    v.normalize_or_zero()
}
