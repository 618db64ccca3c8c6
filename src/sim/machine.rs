//! Game phase state machine
//!
//! Pure transition table plus a helper that applies a transition to the game
//! state and reports it. Side effects of a transition (resetting entities,
//! bumping counters) belong to the caller.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GamePhase, GameState};

/// Actions that trigger phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Player starts (or restarts) a game
    StartGame,
    /// Level bricks arrived and were installed
    LayoutInstalled,
    Pause,
    Resume,
    /// No visible bricks remain
    LevelCleared,
    /// Ball lost; carries the lives left after the loss
    LifeLost { lives_remaining: u32 },
    /// Ball and paddle are back in place after a lost life
    RespawnComplete,
    /// Paint power-up caught
    PaintActivated,
    /// Player picked a color in the color picker
    ColorSelected,
    /// Level-complete banner has been shown long enough
    LevelDelayElapsed,
    /// Score saved locally or on chain
    ScoreSubmitted,
    MainMenu,
}

/// Result of a transition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionResult {
    pub success: bool,
    pub from: GamePhase,
    pub to: GamePhase,
    pub action: GameAction,
}

/// Phase reached by applying `action` in `from`, if the transition is legal
pub fn next_phase(from: GamePhase, action: GameAction) -> Option<GamePhase> {
    use GameAction as A;
    use GamePhase::*;

    match (from, action) {
        // Restart is allowed from anywhere
        (_, A::StartGame) => Some(Loading),

        (Loading, A::LayoutInstalled) => Some(Playing),

        (Playing, A::Pause) => Some(Paused),
        (Paused, A::Resume) => Some(Playing),

        (Playing | ColorPicker, A::LevelCleared) => Some(LevelComplete),
        (LevelComplete, A::LevelDelayElapsed) => Some(Loading),

        (Playing, A::LifeLost { lives_remaining: 0 }) => Some(GameOver),
        (Playing, A::LifeLost { .. }) => Some(Respawning),
        (Respawning, A::RespawnComplete) => Some(Playing),

        (Playing, A::PaintActivated) => Some(ColorPicker),
        (ColorPicker, A::ColorSelected) => Some(Playing),

        (GameOver, A::ScoreSubmitted) => Some(Leaderboard),

        (Start | GameOver | Leaderboard | Paused, A::MainMenu) => Some(Start),

        _ => None,
    }
}

/// Attempt a transition, recording a `PhaseChanged` event on success
pub fn transition(
    state: &mut GameState,
    action: GameAction,
    events: &mut Vec<GameEvent>,
) -> TransitionResult {
    let from = state.phase;
    match next_phase(from, action) {
        Some(to) => {
            state.phase = to;
            if from != to {
                events.push(GameEvent::PhaseChanged { from, to });
            }
            log::info!("{:?} --{:?}--> {:?}", from, action, to);
            TransitionResult {
                success: true,
                from,
                to,
                action,
            }
        }
        None => {
            log::debug!("Ignored {:?} while {:?}", action, from);
            TransitionResult {
                success: false,
                from,
                to: from,
                action,
            }
        }
    }
}
