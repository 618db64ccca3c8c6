//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - One call per display frame, velocities in pixels per frame
//! - Seeded RNG only
//! - Bricks kept in row-major order
//! - No I/O; time arrives as an explicit millisecond clock

pub mod collision;
pub mod effects;
pub mod machine;
pub mod physics;
pub mod state;
pub mod tick;

pub use collision::{Circle, Rect, Wall, circle_rect_collision};
pub use effects::{Activation, activate, add_bricks, expire, launch_ball, paint};
pub use machine::{GameAction, TransitionResult, next_phase, transition};
pub use physics::{FrameOutcome, Resolution, resolve_frame};
pub use state::{
    ActiveEffects, Ball, Brick, BrickColor, BrickHit, GameEvent, GamePhase, GameState, GameStats,
    GridSlot, Paddle, PowerKind, PowerUp,
};
pub use tick::{
    FrameInput, install_level, return_to_menu, score_submitted, select_color, start_game, tick,
};
