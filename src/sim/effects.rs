//! Power-up effect engine
//!
//! Activation happens when the paddle catches a pickup; expiry is checked once
//! per played frame against wall-clock deadlines.

use std::collections::HashSet;

use rand::Rng;

use super::state::{Brick, BrickColor, GameEvent, GameState, GridSlot, PowerKind};
use crate::consts::*;

/// What an activation asks of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Effect applied, keep playing
    Applied,
    /// Paint: play must stop until the player picks a color
    NeedsColorChoice,
}

/// Apply a caught power-up
pub fn activate(
    state: &mut GameState,
    kind: PowerKind,
    now: u64,
    events: &mut Vec<GameEvent>,
) -> Activation {
    log::info!("Power-up activated: {:?}", kind);
    match kind {
        PowerKind::Sticky => {
            state.effects.sticky_charges = STICKY_CHARGES;
        }
        PowerKind::Paint => return Activation::NeedsColorChoice,
        PowerKind::Invincible => {
            state.effects.invincible_until = Some(now.saturating_add(INVINCIBLE_DURATION_MS));
        }
        PowerKind::ShrinkPaddle => {
            state.paddle.set_width(PADDLE_WIDTH_DEFAULT * SHRINK_FACTOR);
            state.effects.shrink_until = Some(now.saturating_add(SHRINK_DURATION_MS));
        }
        PowerKind::AddBricks => {
            let added = add_bricks(state);
            events.push(GameEvent::BricksAdded(added));
        }
    }
    Activation::Applied
}

/// Refill empty grid slots with fresh 2-HP bricks
///
/// Adds `ceil(visible * 15%)` bricks into uniformly random slots not taken by
/// a visible brick. Never overwrites, never exceeds the grid.
pub fn add_bricks(state: &mut GameState) -> usize {
    let visible = state.visible_brick_count();
    let wanted = (visible * ADD_BRICKS_PERCENT).div_ceil(100);

    let occupied: HashSet<GridSlot> = state
        .bricks
        .iter()
        .filter(|b| b.visible)
        .filter_map(|b| b.slot())
        .collect();
    let mut free: Vec<GridSlot> = GridSlot::all().filter(|s| !occupied.contains(s)).collect();

    let mut added = 0;
    while added < wanted && !free.is_empty() {
        let slot = free.swap_remove(state.rng.random_range(0..free.len()));
        state
            .bricks
            .push(Brick::at(slot, BrickColor::for_row(slot.row), None));
        added += 1;
    }

    state.normalize_order();
    log::debug!("Added {} bricks ({} were visible)", added, visible);
    added
}

/// Clear timed effects whose deadline has passed
pub fn expire(state: &mut GameState, now: u64, events: &mut Vec<GameEvent>) {
    if state.effects.shrink_until.is_some_and(|until| now > until) {
        state.paddle.set_width(PADDLE_WIDTH_DEFAULT);
        state.effects.shrink_until = None;
        events.push(GameEvent::EffectExpired(PowerKind::ShrinkPaddle));
        log::debug!("Shrink expired");
    }
    if state.effects.invincible_until.is_some_and(|until| now > until) {
        state.effects.invincible_until = None;
        events.push(GameEvent::EffectExpired(PowerKind::Invincible));
        log::debug!("Invincibility expired");
    }
}

/// Launch an attached ball, spending one sticky charge if any are left
pub fn launch_ball(state: &mut GameState) -> bool {
    if !state.ball.launch() {
        return false;
    }
    state.effects.sticky_charges = state.effects.sticky_charges.saturating_sub(1);
    true
}

/// Clear every visible brick whose original color matches. Returns the count.
pub fn paint(state: &mut GameState, color: BrickColor) -> usize {
    let mut cleared = 0;
    for brick in state
        .bricks
        .iter_mut()
        .filter(|b| b.visible && b.original_color == color)
    {
        brick.clear();
        cleared += 1;
    }
    if cleared > 0 {
        state.stats.award(cleared as u64 * POINTS_PER_BRICK);
    }
    log::info!("Paint cleared {} {:?} bricks", cleared, color);
    cleared
}
