//! Collision detection for circles against axis-aligned rectangles
//!
//! Ball vs paddle, ball vs brick, ball vs play-field edges, and power-up vs
//! paddle all go through the same closest-point test.

use glam::Vec2;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn min(&self) -> Vec2 {
        self.pos
    }

    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Closest point of the rectangle to `p` (p itself when inside)
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }
}

/// A circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// True iff the closest point of `rect` to the circle center is within the
/// radius. Touching counts as a hit.
#[inline]
pub fn circle_rect_collision(circle: Circle, rect: Rect) -> bool {
    let closest = rect.closest_point(circle.center);
    (circle.center - closest).length_squared() <= circle.radius * circle.radius
}

/// Thickness of the virtual slabs outside the play field
const WALL_THICKNESS: f32 = 1000.0;

/// Play-field edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
    Top,
    Bottom,
}

impl Wall {
    /// Slab just outside the canvas on this side
    pub fn rect(&self) -> Rect {
        let t = WALL_THICKNESS;
        match self {
            Wall::Left => Rect::new(
                Vec2::new(-t, -t),
                Vec2::new(t, CANVAS_HEIGHT + 2.0 * t),
            ),
            Wall::Right => Rect::new(
                Vec2::new(CANVAS_WIDTH, -t),
                Vec2::new(t, CANVAS_HEIGHT + 2.0 * t),
            ),
            Wall::Top => Rect::new(Vec2::new(-t, -t), Vec2::new(CANVAS_WIDTH + 2.0 * t, t)),
            Wall::Bottom => Rect::new(
                Vec2::new(-t, CANVAS_HEIGHT),
                Vec2::new(CANVAS_WIDTH + 2.0 * t, t),
            ),
        }
    }

    /// Does the circle touch or cross this edge?
    pub fn touches(&self, circle: Circle) -> bool {
        circle_rect_collision(circle, self.rect())
    }
}
