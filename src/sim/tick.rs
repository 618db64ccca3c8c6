//! Per-frame simulation step
//!
//! One call to [`tick`] is one display frame. Input is sampled intent (pointer
//! position, nudges, one-shot launch and pause presses); time is the wall
//! clock in milliseconds, used only for effect deadlines and the level
//! complete delay.

use super::effects::{self, Activation};
use super::machine::{GameAction, TransitionResult, transition};
use super::physics::{self, FrameOutcome};
use super::state::{Brick, BrickColor, GameEvent, GamePhase, GameState, GameStats};

/// Input commands for a single frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer x in play-field coordinates (paddle centers on it)
    pub pointer_x: Option<f32>,
    /// Keyboard nudge direction: -1 left, +1 right, 0 none
    pub nudge: f32,
    /// Launch an attached ball (click/tap/space)
    pub launch: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game by one frame
pub fn tick(state: &mut GameState, input: &FrameInput, now: u64) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.pause {
        toggle_pause(state, now, &mut events);
    }

    match state.phase {
        GamePhase::Playing => play_frame(state, input, now, &mut events),
        GamePhase::LevelComplete => {
            let delay = state.tuning.level_complete_delay_ms;
            if state
                .level_cleared_at
                .is_some_and(|at| now >= at.saturating_add(delay))
            {
                state.level_cleared_at = None;
                transition(state, GameAction::LevelDelayElapsed, &mut events);
            }
        }
        GamePhase::Respawning => respawn(state, &mut events),
        // Everything else waits on the session (loading, menus, color choice)
        _ => {}
    }

    events
}

fn toggle_pause(state: &mut GameState, now: u64, events: &mut Vec<GameEvent>) {
    match state.phase {
        GamePhase::Playing => {
            state.paused_at = Some(now);
            transition(state, GameAction::Pause, events);
        }
        GamePhase::Paused => {
            if let Some(at) = state.paused_at.take() {
                state.effects.postpone(now.saturating_sub(at));
            }
            transition(state, GameAction::Resume, events);
        }
        _ => {}
    }
}

fn play_frame(state: &mut GameState, input: &FrameInput, now: u64, events: &mut Vec<GameEvent>) {
    // Paddle intent
    if let Some(x) = input.pointer_x {
        state.paddle_target_x = state.paddle.clamp_x(x - state.paddle.width / 2.0);
    }
    if input.nudge != 0.0 {
        state.paddle_target_x = state
            .paddle
            .clamp_x(state.paddle_target_x + input.nudge.signum() * state.tuning.paddle_speed);
    }
    state
        .paddle
        .move_toward(state.paddle_target_x, state.tuning.paddle_smoothing);

    if input.launch && effects::launch_ball(state) {
        events.push(GameEvent::BallLaunched);
    }

    effects::expire(state, now, events);

    let resolution = physics::resolve_frame(state, events);
    match resolution.outcome {
        FrameOutcome::LevelCleared => complete_level(state, now, events),
        FrameOutcome::LifeLost => {
            let lives_remaining = state.stats.lose_life();
            log::info!("Ball lost, {} lives left", lives_remaining);
            transition(state, GameAction::LifeLost { lives_remaining }, events);
            if state.phase == GamePhase::Respawning {
                respawn(state, events);
            }
        }
        FrameOutcome::Continue => {
            for kind in resolution.caught {
                if effects::activate(state, kind, now, events) == Activation::NeedsColorChoice
                    && state.phase == GamePhase::Playing
                    && transition(state, GameAction::PaintActivated, events).success
                {
                    // Timers stand still until a color is chosen
                    state.paused_at = Some(now);
                }
            }
        }
    }
}

fn complete_level(state: &mut GameState, now: u64, events: &mut Vec<GameEvent>) {
    let result = transition(state, GameAction::LevelCleared, events);
    if result.success {
        state.stats.level += 1;
        state.level_cleared_at = Some(now);
        state.power_ups.clear();
        log::info!(
            "Level cleared, next is {} (score {})",
            state.stats.level,
            state.stats.score
        );
    }
}

fn respawn(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.reset_ball_and_paddle();
    events.push(GameEvent::BallRespawned);
    transition(state, GameAction::RespawnComplete, events);
}

/// Begin a new game from any phase: fresh stats, empty field, waiting for a layout
pub fn start_game(state: &mut GameState, events: &mut Vec<GameEvent>) -> TransitionResult {
    let result = transition(state, GameAction::StartGame, events);
    state.stats = GameStats::default();
    state.bricks.clear();
    state.reset_ball_and_paddle();
    state.paused_at = None;
    state.level_cleared_at = None;
    result
}

/// Install the bricks for the current level and start playing it
pub fn install_level(
    state: &mut GameState,
    bricks: Vec<Brick>,
    events: &mut Vec<GameEvent>,
) -> TransitionResult {
    let result = transition(state, GameAction::LayoutInstalled, events);
    if result.success {
        state.reset_ball_and_paddle();
        state.install_bricks(bricks);
        log::info!(
            "Level {} installed with {} bricks",
            state.stats.level,
            state.visible_brick_count()
        );
    }
    result
}

/// Resolve a pending paint choice. Returns how many bricks were cleared, or
/// None when no color choice was pending.
pub fn select_color(
    state: &mut GameState,
    color: BrickColor,
    now: u64,
    events: &mut Vec<GameEvent>,
) -> Option<usize> {
    if state.phase != GamePhase::ColorPicker {
        return None;
    }
    if let Some(at) = state.paused_at.take() {
        state.effects.postpone(now.saturating_sub(at));
    }
    let cleared = effects::paint(state, color);
    if state.visible_brick_count() == 0 {
        events.push(GameEvent::LevelCleared);
        complete_level(state, now, events);
    } else {
        transition(state, GameAction::ColorSelected, events);
    }
    Some(cleared)
}

/// Leave for the title screen
pub fn return_to_menu(state: &mut GameState, events: &mut Vec<GameEvent>) -> TransitionResult {
    let result = transition(state, GameAction::MainMenu, events);
    if result.success {
        state.paused_at = None;
    }
    result
}

/// The final score has been recorded; show the leaderboard
pub fn score_submitted(state: &mut GameState, events: &mut Vec<GameEvent>) -> TransitionResult {
    transition(state, GameAction::ScoreSubmitted, events)
}
