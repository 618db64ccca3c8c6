//! Game state and core simulation types
//!
//! Everything the frame step reads or writes lives here. Entities are plain
//! values owned by [`GameState`]; nothing aliases them across frames.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;
use crate::settings::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    /// Title screen
    Start,
    /// Waiting for the level provider
    Loading,
    /// Active gameplay
    Playing,
    /// Game is paused (physics and effect timers frozen)
    Paused,
    /// Level cleared, next level loads after a short delay
    LevelComplete,
    /// Out of lives, waiting for score submission
    GameOver,
    /// Showing the leaderboard
    Leaderboard,
    /// Paint power-up picked up, waiting for a color choice
    ColorPicker,
    /// Life lost, ball and paddle being reset
    Respawning,
}

/// The ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Riding on the paddle, waiting for launch
    pub attached: bool,
}

impl Ball {
    /// Ball attached to the given paddle with the starting velocity
    pub fn on_paddle(paddle: &Paddle) -> Self {
        let mut ball = Self {
            pos: Vec2::ZERO,
            vel: BALL_START_VELOCITY,
            radius: BALL_RADIUS,
            attached: true,
        };
        ball.update_attached(paddle);
        ball
    }

    /// Keep an attached ball centered on top of the paddle
    pub fn update_attached(&mut self, paddle: &Paddle) {
        if self.attached {
            self.pos = Vec2::new(paddle.center_x(), paddle.pos.y - self.radius);
        }
    }

    /// Release an attached ball upward. Returns false if it was already free.
    pub fn launch(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        self.attached = false;
        self.vel.y = if self.vel.y != 0.0 {
            -self.vel.y.abs()
        } else {
            BALL_START_VELOCITY.y
        };
        true
    }
}

/// The player's paddle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            pos: Vec2::new((CANVAS_WIDTH - PADDLE_WIDTH_DEFAULT) / 2.0, PADDLE_Y),
            width: PADDLE_WIDTH_DEFAULT,
            height: PADDLE_HEIGHT,
        }
    }
}

impl Paddle {
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.pos, Vec2::new(self.width, self.height))
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Rightmost legal left edge for the current width
    pub fn max_x(&self) -> f32 {
        (CANVAS_WIDTH - self.width).max(0.0)
    }

    /// Clamp a left-edge position into the play field
    pub fn clamp_x(&self, x: f32) -> f32 {
        crate::clamp(x, 0.0, self.max_x())
    }

    /// Ease toward a target left edge, staying inside the play field
    pub fn move_toward(&mut self, target_x: f32, smoothing: f32) {
        let target = self.clamp_x(target_x);
        let next = self.pos.x + (target - self.pos.x) * smoothing;
        self.pos.x = self.clamp_x(next);
    }

    /// Change width around the current left edge, re-clamping position
    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.pos.x = self.clamp_x(self.pos.x);
    }
}

/// Brick colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrickColor {
    Magenta,
    Lime,
    Orange,
    Indigo,
    /// Display color of a brick that has taken a hit
    Damaged,
}

impl BrickColor {
    /// Colors a layout can place (the ones paint can target)
    pub const PALETTE: [BrickColor; 4] = [
        BrickColor::Magenta,
        BrickColor::Lime,
        BrickColor::Orange,
        BrickColor::Indigo,
    ];

    /// Color for a non-zero layout cell value
    pub fn from_cell(value: u32) -> Option<Self> {
        if value == 0 {
            return None;
        }
        Some(Self::PALETTE[(value as usize - 1) % Self::PALETTE.len()])
    }

    /// Row-striped color used by generated and refilled bricks
    pub fn for_row(row: usize) -> Self {
        Self::PALETTE[row % Self::PALETTE.len()]
    }

    pub fn hex(&self) -> &'static str {
        match self {
            BrickColor::Magenta => "#ff00ff",
            BrickColor::Lime => "#70ff00",
            BrickColor::Orange => "#f89a1d",
            BrickColor::Indigo => "#3d25b5",
            BrickColor::Damaged => "#999999",
        }
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        Self::PALETTE
            .into_iter()
            .chain(std::iter::once(BrickColor::Damaged))
            .find(|c| c.hex().eq_ignore_ascii_case(s))
    }
}

/// A cell in the brick grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridSlot {
    pub row: usize,
    pub col: usize,
}

impl GridSlot {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Top-left corner of a brick placed in this slot
    pub fn position(&self) -> Vec2 {
        Vec2::new(
            BRICK_GAP + self.col as f32 * (BRICK_WIDTH + BRICK_GAP),
            BRICK_GAP + BRICK_TOP_OFFSET + self.row as f32 * (BRICK_HEIGHT + BRICK_GAP),
        )
    }

    /// Inverse of [`GridSlot::position`]; None when outside the grid
    pub fn from_position(pos: Vec2) -> Option<Self> {
        let row = ((pos.y - BRICK_TOP_OFFSET - BRICK_GAP) / (BRICK_HEIGHT + BRICK_GAP)).round();
        let col = ((pos.x - BRICK_GAP) / (BRICK_WIDTH + BRICK_GAP)).round();
        if row < 0.0 || col < 0.0 || row >= BRICK_ROWS as f32 || col >= BRICK_COLS as f32 {
            return None;
        }
        Some(Self::new(row as usize, col as usize))
    }

    /// Every slot in row-major order
    pub fn all() -> impl Iterator<Item = GridSlot> {
        (0..BRICK_ROWS).flat_map(|row| (0..BRICK_COLS).map(move |col| GridSlot::new(row, col)))
    }
}

/// Power-up and power-down types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerKind {
    Sticky,
    Paint,
    Invincible,
    ShrinkPaddle,
    AddBricks,
}

impl PowerKind {
    pub const ALL: [PowerKind; 5] = [
        PowerKind::Sticky,
        PowerKind::Paint,
        PowerKind::Invincible,
        PowerKind::ShrinkPaddle,
        PowerKind::AddBricks,
    ];

    /// Power-downs hurt the player
    pub fn is_power_down(&self) -> bool {
        matches!(self, PowerKind::ShrinkPaddle | PowerKind::AddBricks)
    }
}

/// Result of hitting a brick once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrickHit {
    Damaged,
    Destroyed,
}

/// A brick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: u32,
    pub max_hp: u32,
    /// Display color (changes when damaged)
    pub color: BrickColor,
    /// Color at creation, used for paint matching
    pub original_color: BrickColor,
    pub visible: bool,
    pub power_up: Option<PowerKind>,
}

impl Brick {
    /// Full-health brick in a grid slot
    pub fn at(slot: GridSlot, color: BrickColor, power_up: Option<PowerKind>) -> Self {
        Self {
            pos: slot.position(),
            size: Vec2::new(BRICK_WIDTH, BRICK_HEIGHT),
            hp: BRICK_HP_DEFAULT,
            max_hp: BRICK_HP_DEFAULT,
            color,
            original_color: color,
            visible: true,
            power_up,
        }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Grid slot this brick sits in, recovered from its position
    pub fn slot(&self) -> Option<GridSlot> {
        GridSlot::from_position(self.pos)
    }

    /// Take one point of damage. Invisible bricks are never touched again.
    pub fn hit(&mut self) -> Option<BrickHit> {
        if !self.visible {
            return None;
        }
        self.hp = self.hp.saturating_sub(1);
        if self.hp == 0 {
            self.visible = false;
            Some(BrickHit::Destroyed)
        } else {
            self.color = BrickColor::Damaged;
            Some(BrickHit::Damaged)
        }
    }

    /// Remove the brick without damage (paint clearing)
    pub fn clear(&mut self) {
        self.visible = false;
    }
}

/// A falling pickup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    /// Center
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: PowerKind,
    pub size: f32,
}

impl PowerUp {
    pub fn spawn(kind: PowerKind, pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::new(0.0, POWER_UP_SPEED),
            kind,
            size: POWER_UP_SIZE,
        }
    }
}

/// Active power-up effects
///
/// Timers are absolute wall-clock deadlines in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub sticky_charges: u32,
    pub shrink_until: Option<u64>,
    pub invincible_until: Option<u64>,
}

impl ActiveEffects {
    pub fn is_invincible(&self) -> bool {
        self.invincible_until.is_some()
    }

    pub fn is_shrunk(&self) -> bool {
        self.shrink_until.is_some()
    }

    /// Push every running timer back (used when resuming from pause)
    pub fn postpone(&mut self, by_ms: u64) {
        if let Some(t) = self.shrink_until.as_mut() {
            *t = t.saturating_add(by_ms);
        }
        if let Some(t) = self.invincible_until.as_mut() {
            *t = t.saturating_add(by_ms);
        }
    }
}

/// Score, lives, level, combo for one game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u64,
    pub lives: u32,
    /// 1-based
    pub level: u32,
    pub combo: u32,
}

impl Default for GameStats {
    fn default() -> Self {
        Self {
            score: 0,
            lives: INITIAL_LIVES,
            level: 1,
            combo: 0,
        }
    }
}

impl GameStats {
    /// Add points and bump the combo counter
    pub fn award(&mut self, points: u64) {
        self.score += points;
        self.combo += 1;
    }

    /// Lose a life and drop the combo. Returns remaining lives.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.combo = 0;
        self.lives
    }
}

/// Things that happened during a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Snapshot of the brick as it was removed
    BrickDestroyed { brick: Brick, had_power_up: bool },
    /// Snapshot of the brick after taking the hit
    BrickDamaged { brick: Brick },
    LevelCleared,
    LifeLost,
    BallRespawned,
    BallLaunched,
    PaddleHit,
    WallHit,
    PowerUpSpawned(PowerKind),
    PowerUpCaught(PowerKind),
    /// A timed effect ran out (shrink or invincible)
    EffectExpired(PowerKind),
    BricksAdded(usize),
    PhaseChanged { from: GamePhase, to: GamePhase },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: GamePhase,
    pub stats: GameStats,
    pub paddle: Paddle,
    /// Left edge the paddle is easing toward
    pub paddle_target_x: f32,
    pub ball: Ball,
    /// Kept in row-major slot order
    pub bricks: Vec<Brick>,
    pub power_ups: Vec<PowerUp>,
    pub effects: ActiveEffects,
    pub tuning: Tuning,
    /// Power-up assignment and brick refills
    pub rng: Pcg32,
    /// When the current pause or color choice started
    pub paused_at: Option<u64>,
    /// When the level was cleared
    pub level_cleared_at: Option<u64>,
}

impl GameState {
    /// Fresh state on the title screen
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let paddle = Paddle::default();
        Self {
            phase: GamePhase::Start,
            stats: GameStats::default(),
            paddle_target_x: paddle.pos.x,
            ball: Ball::on_paddle(&paddle),
            paddle,
            bricks: Vec::new(),
            power_ups: Vec::new(),
            effects: ActiveEffects::default(),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            paused_at: None,
            level_cleared_at: None,
        }
    }

    /// Default paddle, ball back on it, effects and falling power-ups cleared
    pub fn reset_ball_and_paddle(&mut self) {
        self.paddle = Paddle::default();
        self.paddle_target_x = self.paddle.pos.x;
        self.ball = Ball::on_paddle(&self.paddle);
        self.effects = ActiveEffects::default();
        self.power_ups.clear();
    }

    /// Replace the level's bricks wholesale
    pub fn install_bricks(&mut self, bricks: Vec<Brick>) {
        self.bricks = bricks;
        self.normalize_order();
    }

    pub fn visible_brick_count(&self) -> usize {
        self.bricks.iter().filter(|b| b.visible).count()
    }

    /// Keep bricks in row-major order so collision scans are stable
    pub fn normalize_order(&mut self) {
        self.bricks
            .sort_by_key(|b| b.slot().unwrap_or(GridSlot::new(usize::MAX, usize::MAX)));
    }
}
