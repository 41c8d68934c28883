//! Collision detection and the two resolution policies
//!
//! Overlap testing is plain axis-aligned rectangle intersection; what differs
//! between game modes is the response. Lethal mode turns any contact into a
//! terminal result. Elastic mode keeps the session alive and instead pushes
//! the avatar back out, bleeding off speed.

use serde::{Deserialize, Serialize};

use super::avatar::Avatar;
use super::obstacles::Obstacle;

/// Fraction of impact speed kept when bouncing off the floor, the ceiling,
/// or the vertical face of an obstacle
const BOUNCE_DAMPING: f32 = 0.3;
/// Velocity retained after being pushed off an obstacle's side
const SIDE_DAMPING: f32 = 0.5;
/// Clearance left between the avatar and the surface it was pushed out of
const PUSH_CLEARANCE: f32 = 5.0;

/// Axis-aligned rectangle, top-left origin, down positive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Strict overlap on both axes; rectangles that merely share an edge do
    /// not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Collision response policy, chosen once at session start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionMode {
    /// Any contact ends the session
    #[default]
    Lethal,
    /// Contact bounces the avatar instead of killing it
    Elastic,
}

/// Test the avatar against the obstacle set and both play-area boundaries,
/// applying the mode's response. Returns whether the contact is terminal.
///
/// In elastic mode at most one obstacle is resolved per tick; the first
/// overlap in iteration order wins. Pairs are spaced far enough apart that
/// simultaneous multi-pair overlap does not occur at normal play speeds, so
/// the tie-break is a documented determinism choice, not a correctness hole.
pub fn resolve(
    avatar: &mut Avatar,
    obstacles: &[Obstacle],
    floor_y: f32,
    mode: CollisionMode,
) -> bool {
    match mode {
        CollisionMode::Lethal => resolve_lethal(avatar, obstacles, floor_y),
        CollisionMode::Elastic => {
            resolve_elastic(avatar, obstacles, floor_y);
            false
        }
    }
}

fn resolve_lethal(avatar: &Avatar, obstacles: &[Obstacle], floor_y: f32) -> bool {
    let bb = avatar.bounding_box();

    if bb.bottom() >= floor_y {
        log::debug!("lethal contact: floor");
        return true;
    }
    if bb.y <= 0.0 {
        log::debug!("lethal contact: ceiling");
        return true;
    }
    for obstacle in obstacles {
        if bb.overlaps(&obstacle.rect()) {
            log::debug!("lethal contact: obstacle at x={}", obstacle.x);
            return true;
        }
    }
    false
}

fn resolve_elastic(avatar: &mut Avatar, obstacles: &[Obstacle], floor_y: f32) {
    bounce_boundaries(avatar, floor_y);
    bounce_obstacle(avatar, obstacles);
}

/// Reposition just inside the boundary and reflect velocity with damping
fn bounce_boundaries(avatar: &mut Avatar, floor_y: f32) {
    let half_h = avatar.height / 2.0;

    if avatar.pos.y - half_h <= 0.0 {
        avatar.pos.y = half_h;
        avatar.velocity = avatar.velocity.abs() * BOUNCE_DAMPING;
    }

    if avatar.pos.y + half_h >= floor_y {
        avatar.pos.y = floor_y - half_h;
        avatar.velocity = -avatar.velocity.abs() * BOUNCE_DAMPING;
    }
}

/// Push the avatar out of the first overlapping obstacle along the axis of
/// larger center offset, damping velocity on that axis.
fn bounce_obstacle(avatar: &mut Avatar, obstacles: &[Obstacle]) {
    let bb = avatar.bounding_box();
    let half_w = avatar.width / 2.0;
    let half_h = avatar.height / 2.0;

    for obstacle in obstacles {
        let rect = obstacle.rect();
        if !bb.overlaps(&rect) {
            continue;
        }

        let dx = avatar.pos.x - rect.center_x();
        let dy = avatar.pos.y - rect.center_y();

        if dx.abs() > dy.abs() {
            // Side contact: push out horizontally
            if dx > 0.0 {
                avatar.pos.x = rect.right() + half_w + PUSH_CLEARANCE;
            } else {
                avatar.pos.x = rect.x - half_w - PUSH_CLEARANCE;
            }
            avatar.velocity *= SIDE_DAMPING;
        } else {
            // Top/bottom contact: push out vertically and reflect
            if dy > 0.0 {
                avatar.pos.y = rect.bottom() + half_h + PUSH_CLEARANCE;
                avatar.velocity = avatar.velocity.abs() * BOUNCE_DAMPING;
            } else {
                avatar.pos.y = rect.y - half_h - PUSH_CLEARANCE;
                avatar.velocity = -avatar.velocity.abs() * BOUNCE_DAMPING;
            }
        }

        // One obstacle per tick; first match in iteration order wins.
        break;
    }
}
