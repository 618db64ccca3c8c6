//! Collision and physics resolver
//!
//! Advances the ball, bricks and falling power-ups by one frame while the game
//! is being played. Velocities are in pixels per frame.

use super::collision::{Circle, Wall, circle_rect_collision};
use super::state::{BrickHit, GameEvent, GameState, PowerKind, PowerUp};
use crate::consts::*;

/// How the frame ended for the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    /// No visible bricks remain
    LevelCleared,
    /// Ball reached the bottom without invincibility
    LifeLost,
}

/// Result of resolving one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub outcome: FrameOutcome,
    /// Power-ups the paddle caught this frame, in fall order
    pub caught: Vec<PowerKind>,
}

/// Advance ball, bricks and power-ups by one frame
///
/// Falling power-ups only move on frames that neither clear the level nor
/// lose the ball; both of those reset the field anyway.
pub fn resolve_frame(state: &mut GameState, events: &mut Vec<GameEvent>) -> Resolution {
    let outcome = advance_ball(state, events);
    let caught = if outcome == FrameOutcome::Continue {
        advance_power_ups(state, events)
    } else {
        Vec::new()
    };
    Resolution { outcome, caught }
}

fn advance_ball(state: &mut GameState, events: &mut Vec<GameEvent>) -> FrameOutcome {
    if state.ball.attached {
        state.ball.update_attached(&state.paddle);
        return FrameOutcome::Continue;
    }

    let speed = if state.effects.is_invincible() {
        INVINCIBLE_SPEED_MULTIPLIER
    } else {
        1.0
    };
    state.ball.pos += state.ball.vel * speed;
    debug_assert!(
        state.ball.pos.is_finite() && state.ball.vel.is_finite(),
        "ball left the reals: pos={:?} vel={:?}",
        state.ball.pos,
        state.ball.vel
    );

    reflect_off_walls(state, events);
    bounce_off_paddle(state, events);
    hit_first_brick(state, events);

    if state.visible_brick_count() == 0 {
        events.push(GameEvent::LevelCleared);
        return FrameOutcome::LevelCleared;
    }

    let ball = &mut state.ball;
    if Wall::Bottom.touches(Circle::new(ball.pos, ball.radius)) {
        if state.effects.is_invincible() {
            ball.vel.y = -ball.vel.y.abs();
            ball.pos.y = CANVAS_HEIGHT - ball.radius;
            events.push(GameEvent::WallHit);
        } else {
            events.push(GameEvent::LifeLost);
            return FrameOutcome::LifeLost;
        }
    }

    FrameOutcome::Continue
}

/// Flip the velocity component heading into a side or the top, then pull the
/// ball back inside so it cannot stay out for more than one frame.
fn reflect_off_walls(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let ball = &mut state.ball;
    let r = ball.radius;
    let circle = Circle::new(ball.pos, r);

    if Wall::Left.touches(circle) && ball.vel.x < 0.0 {
        ball.vel.x = -ball.vel.x;
        events.push(GameEvent::WallHit);
    } else if Wall::Right.touches(circle) && ball.vel.x > 0.0 {
        ball.vel.x = -ball.vel.x;
        events.push(GameEvent::WallHit);
    }
    if Wall::Top.touches(circle) && ball.vel.y < 0.0 {
        ball.vel.y = -ball.vel.y;
        events.push(GameEvent::WallHit);
    }

    ball.pos.x = crate::clamp(ball.pos.x, r, CANVAS_WIDTH - r);
    ball.pos.y = ball.pos.y.max(r);
}

/// Only a descending ball can hit the paddle, so a ball still overlapping it
/// after a bounce is not bounced back down.
fn bounce_off_paddle(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let paddle = state.paddle;
    let ball = &mut state.ball;
    if ball.vel.y <= 0.0 || !circle_rect_collision(Circle::new(ball.pos, ball.radius), paddle.as_rect())
    {
        return;
    }

    if state.effects.sticky_charges > 0 {
        // Charge is spent on the next launch, not here
        ball.attached = true;
        ball.update_attached(&paddle);
    } else {
        let half = paddle.width / 2.0;
        let offset = crate::clamp((ball.pos.x - paddle.center_x()) / half, -1.0, 1.0);
        ball.vel.y = -ball.vel.y;
        ball.vel.x = offset * state.tuning.max_deflection;
    }
    events.push(GameEvent::PaddleHit);
}

/// At most one brick per frame: the first visible brick in row-major order
fn hit_first_brick(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let circle = Circle::new(state.ball.pos, state.ball.radius);
    let Some(index) = state
        .bricks
        .iter()
        .position(|b| b.visible && circle_rect_collision(circle, b.as_rect()))
    else {
        return;
    };

    state.ball.vel.y = -state.ball.vel.y;
    let brick = &mut state.bricks[index];
    let hit = brick.hit();
    let brick = *brick;
    match hit {
        Some(BrickHit::Destroyed) => {
            let had_power_up = brick.power_up.is_some();
            let spawn = brick.power_up.map(|kind| PowerUp::spawn(kind, brick.center()));
            state.stats.award(POINTS_PER_BRICK);
            events.push(GameEvent::BrickDestroyed { brick, had_power_up });
            if let Some(power_up) = spawn {
                log::debug!("{:?} dropped at {:?}", power_up.kind, power_up.pos);
                events.push(GameEvent::PowerUpSpawned(power_up.kind));
                state.power_ups.push(power_up);
            }
        }
        Some(BrickHit::Damaged) => events.push(GameEvent::BrickDamaged { brick }),
        None => {}
    }
}

/// Drop power-ups by their fall speed, collecting the ones the paddle catches
/// and discarding the ones that fall off the bottom.
fn advance_power_ups(state: &mut GameState, events: &mut Vec<GameEvent>) -> Vec<PowerKind> {
    let paddle_rect = state.paddle.as_rect();
    let mut caught = Vec::new();

    state.power_ups.retain_mut(|p| {
        p.pos += p.vel;
        if circle_rect_collision(Circle::new(p.pos, p.size / 2.0), paddle_rect) {
            caught.push(p.kind);
            return false;
        }
        p.pos.y - p.size / 2.0 < CANVAS_HEIGHT
    });

    events.extend(caught.iter().map(|&kind| GameEvent::PowerUpCaught(kind)));
    caught
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use crate::settings::Tuning;
    use crate::sim::state::{Brick, BrickColor, GamePhase, GridSlot};

    /// Playing state with one brick tucked in the far corner
    fn playing_state() -> GameState {
        let mut state = GameState::new(1, Tuning::default());
        state.phase = GamePhase::Playing;
        state.install_bricks(vec![Brick::at(GridSlot::new(9, 17), BrickColor::Lime, None)]);
        state
    }

    fn free_ball(state: &mut GameState, pos: Vec2, vel: Vec2) {
        state.ball.attached = false;
        state.ball.pos = pos;
        state.ball.vel = vel;
    }

    #[test]
    fn test_attached_ball_tracks_paddle() {
        let mut state = playing_state();
        state.paddle.pos.x = 100.0;
        let mut events = Vec::new();
        let res = resolve_frame(&mut state, &mut events);
        assert_eq!(res.outcome, FrameOutcome::Continue);
        assert_eq!(state.ball.pos.x, 160.0);
        assert!(state.ball.attached);
    }

    #[test]
    fn test_left_wall_reflects_and_clamps() {
        let mut state = playing_state();
        free_ball(&mut state, Vec2::new(12.0, 300.0), Vec2::new(-4.0, 1.0));
        let mut events = Vec::new();
        resolve_frame(&mut state, &mut events);
        assert_eq!(state.ball.vel.x, 4.0);
        assert_eq!(state.ball.pos.x, BALL_RADIUS);
        assert!(events.contains(&GameEvent::WallHit));
    }

    #[test]
    fn test_top_wall_reflects() {
        let mut state = playing_state();
        free_ball(&mut state, Vec2::new(400.0, 12.0), Vec2::new(1.0, -4.0));
        let mut events = Vec::new();
        resolve_frame(&mut state, &mut events);
        assert_eq!(state.ball.vel.y, 4.0);
        assert_eq!(state.ball.pos.y, BALL_RADIUS);
    }

    #[test]
    fn test_paddle_deflection_by_offset() {
        let mut state = playing_state();
        // Paddle spans 340..460, center 400, top at 560
        free_ball(&mut state, Vec2::new(430.0, 547.0), Vec2::new(0.0, 4.0));
        let mut events = Vec::new();
        resolve_frame(&mut state, &mut events);
        assert_eq!(state.ball.vel.y, -4.0);
        assert!((state.ball.vel.x - 3.0).abs() < 1e-5);
        assert!(events.contains(&GameEvent::PaddleHit));
    }

    #[test]
    fn test_paddle_ignores_rising_ball() {
        let mut state = playing_state();
        free_ball(&mut state, Vec2::new(430.0, 555.0), Vec2::new(1.0, -4.0));
        let mut events = Vec::new();
        resolve_frame(&mut state, &mut events);
        assert_eq!(state.ball.vel, Vec2::new(1.0, -4.0));
    }

    #[test]
    fn test_sticky_paddle_attaches_without_spending_charge() {
        let mut state = playing_state();
        state.effects.sticky_charges = 2;
        free_ball(&mut state, Vec2::new(380.0, 547.0), Vec2::new(2.0, 4.0));
        let mut events = Vec::new();
        resolve_frame(&mut state, &mut events);
        assert!(state.ball.attached);
        assert_eq!(state.effects.sticky_charges, 2);
        assert_eq!(state.ball.pos.x, state.paddle.center_x());
    }

    #[test]
    fn test_first_brick_only_at_seam() {
        let mut state = GameState::new(1, Tuning::default());
        state.phase = GamePhase::Playing;
        state.install_bricks(vec![
            Brick::at(GridSlot::new(0, 1), BrickColor::Lime, None),
            Brick::at(GridSlot::new(0, 0), BrickColor::Magenta, None),
        ]);
        // Seam between columns 0 and 1 sits at x ~= 45.8
        let seam_x = (GridSlot::new(0, 0).position().x + BRICK_WIDTH + GridSlot::new(0, 1).position().x) / 2.0;
        free_ball(&mut state, Vec2::new(seam_x, 74.0), Vec2::new(0.0, -4.0));
        let mut events = Vec::new();
        resolve_frame(&mut state, &mut events);

        // Row-major order puts column 0 first after install
        assert_eq!(state.bricks[0].original_color, BrickColor::Magenta);
        assert_eq!(state.bricks[0].hp, 1);
        assert_eq!(state.bricks[1].hp, 2);
        assert_eq!(state.ball.vel.y, 4.0);
        assert_eq!(events, vec![GameEvent::BrickDamaged { brick: state.bricks[0] }]);
    }

    #[test]
    fn test_last_brick_clears_level() {
        let mut state = GameState::new(1, Tuning::default());
        state.phase = GamePhase::Playing;
        let mut brick = Brick::at(GridSlot::new(5, 9), BrickColor::Orange, None);
        brick.hp = 1;
        brick.max_hp = 1;
        let below = brick.pos.y + brick.size.y + BALL_RADIUS + 2.0;
        let center_x = brick.center().x;
        state.install_bricks(vec![brick]);
        free_ball(&mut state, Vec2::new(center_x, below), Vec2::new(0.0, -4.0));

        let mut events = Vec::new();
        let res = resolve_frame(&mut state, &mut events);
        assert_eq!(state.bricks[0].hp, 0);
        assert!(!state.bricks[0].visible);
        assert_eq!(res.outcome, FrameOutcome::LevelCleared);
        assert_eq!(
            events,
            vec![
                GameEvent::BrickDestroyed { brick: state.bricks[0], had_power_up: false },
                GameEvent::LevelCleared,
            ]
        );
        assert_eq!(state.stats.score, POINTS_PER_BRICK);
        assert_eq!(state.stats.combo, 1);
    }

    #[test]
    fn test_destroyed_brick_drops_power_up() {
        let mut state = playing_state();
        let mut brick = Brick::at(GridSlot::new(2, 4), BrickColor::Orange, Some(PowerKind::Sticky));
        brick.hp = 1;
        let center = brick.center();
        let below = brick.pos.y + brick.size.y + BALL_RADIUS + 2.0;
        state.bricks.push(brick);
        state.normalize_order();
        free_ball(&mut state, Vec2::new(center.x, below), Vec2::new(0.0, -4.0));

        let mut events = Vec::new();
        resolve_frame(&mut state, &mut events);
        assert!(events.contains(&GameEvent::PowerUpSpawned(PowerKind::Sticky)));
        assert_eq!(state.power_ups.len(), 1);
        // Spawned at the brick center, then fell one step in the same frame
        assert_eq!(state.power_ups[0].pos, center + Vec2::new(0.0, POWER_UP_SPEED));
    }

    #[test]
    fn test_bottom_loses_life() {
        let mut state = playing_state();
        free_ball(&mut state, Vec2::new(100.0, 588.0), Vec2::new(0.0, 4.0));
        let mut events = Vec::new();
        let res = resolve_frame(&mut state, &mut events);
        assert_eq!(res.outcome, FrameOutcome::LifeLost);
        assert!(events.contains(&GameEvent::LifeLost));
        // Resolver leaves the ball where it fell
        assert_eq!(state.ball.pos.y, 592.0);
    }

    #[test]
    fn test_bottom_bounces_when_invincible() {
        let mut state = playing_state();
        state.effects.invincible_until = Some(10_000);
        free_ball(&mut state, Vec2::new(100.0, 588.0), Vec2::new(0.0, 4.0));
        let mut events = Vec::new();
        let res = resolve_frame(&mut state, &mut events);
        assert_eq!(res.outcome, FrameOutcome::Continue);
        assert!(state.ball.vel.y < 0.0);
        assert_eq!(state.ball.pos.y, CANVAS_HEIGHT - BALL_RADIUS);
    }

    #[test]
    fn test_invincible_speeds_up_ball() {
        let mut state = playing_state();
        state.effects.invincible_until = Some(10_000);
        free_ball(&mut state, Vec2::new(400.0, 300.0), Vec2::new(4.0, -4.0));
        resolve_frame(&mut state, &mut Vec::new());
        assert!((state.ball.pos.x - 404.8).abs() < 1e-4);
        assert!((state.ball.pos.y - 295.2).abs() < 1e-4);
    }

    #[test]
    fn test_power_up_caught_and_missed() {
        let mut state = playing_state();
        let paddle_center = Vec2::new(state.paddle.center_x(), PADDLE_Y - 5.0);
        state.power_ups.push(PowerUp::spawn(PowerKind::Invincible, paddle_center));
        state.power_ups.push(PowerUp::spawn(PowerKind::Paint, Vec2::new(20.0, CANVAS_HEIGHT + 6.0)));
        state.power_ups.push(PowerUp::spawn(PowerKind::AddBricks, Vec2::new(20.0, 100.0)));

        let mut events = Vec::new();
        let res = resolve_frame(&mut state, &mut events);
        assert_eq!(res.caught, vec![PowerKind::Invincible]);
        assert_eq!(state.power_ups.len(), 1);
        assert_eq!(state.power_ups[0].kind, PowerKind::AddBricks);
        assert_eq!(state.power_ups[0].pos.y, 102.0);
    }
}
