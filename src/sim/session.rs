//! Session state and the read-only surface exposed to external consumers

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::avatar::Avatar;
use super::collision::{CollisionMode, Rect};
use super::obstacles::{Obstacle, ObstacleField};
use crate::tuning::Tuning;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle; no simulation stepping
    Ready,
    /// Full tick pipeline active
    Playing,
    /// Simulation frozen, final score frozen
    GameOver,
}

/// Notifications for UI/audio collaborators, drained by the host each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A session began
    Started,
    /// The score changed; carries the new total
    Scored(u32),
    /// A lethal collision ended the session; carries the final score
    GameOver(u32),
}

/// One complete game session: avatar, obstacle field, score, and lifecycle.
///
/// A session is always constructed whole. Starting or restarting builds a
/// fresh value with a bumped generation counter instead of mutating the old
/// one piecemeal, so nothing can observe a half-reset state and a stale
/// frame callback can compare generations and drop itself.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bumped on every construction; lets late callbacks detect staleness
    pub generation: u64,
    pub phase: GamePhase,
    pub mode: CollisionMode,
    pub avatar: Avatar,
    pub field: ObstacleField,
    /// Last score observed by the tick pipeline, for delta detection
    pub score: u32,
    /// Ticks elapsed while Playing
    pub time_ticks: u64,
    /// Floor boundary (the play-area height)
    pub floor_y: f32,
}

impl Session {
    /// Build a fresh session in the given phase. The seed is mixed with the
    /// generation so each run sees a new obstacle sequence while staying
    /// reproducible for a given (seed, generation) pair.
    pub fn new(tuning: &Tuning, mode: CollisionMode, seed: u64, generation: u64) -> Self {
        Self {
            generation,
            phase: GamePhase::Ready,
            mode,
            avatar: Avatar::new(tuning),
            field: ObstacleField::new(tuning, seed.wrapping_add(generation)),
            score: 0,
            time_ticks: 0,
            floor_y: tuning.play_height,
        }
    }

    /// Read-only view of everything a renderer or UI needs this tick
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            avatar: AvatarPose {
                pos: self.avatar.pos,
                rotation: self.avatar.rotation,
                bounding_box: self.avatar.bounding_box(),
            },
            obstacles: self.field.obstacles().to_vec(),
            score: self.field.score(),
            phase: self.phase,
            mode: self.mode,
        }
    }
}

/// Avatar pose as consumers see it
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AvatarPose {
    pub pos: Vec2,
    pub rotation: f32,
    pub bounding_box: Rect,
}

/// Per-tick snapshot for rendering/UI. Owned and serializable so it can
/// cross whatever boundary the host puts between simulation and display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub avatar: AvatarPose,
    pub obstacles: Vec<Obstacle>,
    pub score: u32,
    pub phase: GamePhase,
    pub mode: CollisionMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_ready_and_clean() {
        let s = Session::new(&Tuning::default(), CollisionMode::Lethal, 1, 0);
        assert_eq!(s.phase, GamePhase::Ready);
        assert_eq!(s.score, 0);
        assert_eq!(s.time_ticks, 0);
        assert!(s.field.obstacles().is_empty());
    }

    #[test]
    fn test_generation_changes_obstacle_sequence() {
        let tuning = Tuning::default();
        let mut a = Session::new(&tuning, CollisionMode::Lethal, 42, 0);
        let mut b = Session::new(&tuning, CollisionMode::Lethal, 42, 1);
        a.phase = GamePhase::Playing;
        b.phase = GamePhase::Playing;
        for _ in 0..300 {
            a.field.update();
            b.field.update();
        }
        let heights_a: Vec<f32> = a.field.obstacles().iter().map(|o| o.height).collect();
        let heights_b: Vec<f32> = b.field.obstacles().iter().map(|o| o.height).collect();
        assert_ne!(heights_a, heights_b);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut s = Session::new(&Tuning::default(), CollisionMode::Elastic, 7, 3);
        s.field.update();
        let snap = s.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.obstacles.len(), snap.obstacles.len());
        assert_eq!(back.phase, GamePhase::Ready);
        assert_eq!(back.mode, CollisionMode::Elastic);
    }
}
