//! Procedural obstacle generation, advancement, and scoring

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::tuning::Tuning;

/// Which member of a pair an obstacle is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Hangs from the top edge
    Top,
    /// Stands on the floor
    Bottom,
}

/// One member of an obstacle pair. Pair members share x and width; the gap
/// between them is fixed, only its vertical center is randomized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: ObstacleKind,
    /// Set once when the avatar passes; prevents double counting
    pub scored: bool,
}

impl Obstacle {
    pub fn rect(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    /// The right edge, which must cross the avatar's x for a point
    pub fn trailing_edge(&self) -> f32 {
        self.x + self.width
    }
}

/// How far past the left edge an obstacle may drift before retirement
const RETIRE_MARGIN: f32 = 50.0;

/// How far past the right edge new pairs spawn
const SPAWN_OFFSET: f32 = 50.0;

/// Owns the live obstacle set and the running score.
///
/// Spawning is gap-triggered, not timer-triggered: a new pair appears when
/// the rightmost obstacle has advanced `spawn_spacing` pixels past its spawn
/// point, which keeps horizontal spacing constant regardless of frame jitter.
#[derive(Debug, Clone)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    score: u32,
    rng: Pcg32,
    seed: u64,

    play_width: f32,
    play_height: f32,
    width: f32,
    gap: f32,
    speed: f32,
    spawn_spacing: f32,
    gap_margin_top: f32,
    gap_margin_bottom: f32,
    avatar_x: f32,
}

impl ObstacleField {
    pub fn new(tuning: &Tuning, seed: u64) -> Self {
        Self {
            obstacles: Vec::new(),
            score: 0,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            play_width: tuning.play_width,
            play_height: tuning.play_height,
            width: tuning.obstacle_width,
            gap: tuning.obstacle_gap,
            speed: tuning.obstacle_speed,
            spawn_spacing: tuning.spawn_spacing,
            gap_margin_top: tuning.gap_margin_top,
            gap_margin_bottom: tuning.gap_margin_bottom,
            avatar_x: tuning.avatar_x(),
        }
    }

    /// Advance one fixed tick: move, retire, spawn, score.
    pub fn update(&mut self) {
        for obstacle in &mut self.obstacles {
            obstacle.x -= self.speed;
        }

        self.obstacles
            .retain(|o| o.trailing_edge() > -RETIRE_MARGIN);

        if self.should_spawn() {
            self.spawn_pair();
        }

        self.update_score();
    }

    fn should_spawn(&self) -> bool {
        match self.rightmost_x() {
            Some(x) => x <= self.play_width - self.spawn_spacing,
            None => true,
        }
    }

    fn rightmost_x(&self) -> Option<f32> {
        self.obstacles
            .iter()
            .map(|o| o.x)
            .max_by(|a, b| a.total_cmp(b))
    }

    /// Spawn a matched pair around one random gap center, kept clear of both
    /// play-area edges.
    fn spawn_pair(&mut self) {
        let min_center = self.gap / 2.0 + self.gap_margin_top;
        let max_center = self.play_height - self.gap / 2.0 - self.gap_margin_bottom;
        let gap_center = self.rng.random_range(min_center..=max_center);

        let x = self.play_width + SPAWN_OFFSET;
        let bottom_y = gap_center + self.gap / 2.0;

        let top = Obstacle {
            x,
            y: 0.0,
            width: self.width,
            height: gap_center - self.gap / 2.0,
            kind: ObstacleKind::Top,
            scored: false,
        };
        let bottom = Obstacle {
            x,
            y: bottom_y,
            width: self.width,
            height: self.play_height - bottom_y,
            kind: ObstacleKind::Bottom,
            scored: false,
        };

        log::debug!("spawned obstacle pair at x={x}, gap center {gap_center:.1}");
        self.obstacles.push(top);
        self.obstacles.push(bottom);
    }

    /// Award a point the first tick a pair's trailing edge has passed the
    /// avatar. Only top members are checked; the bottom member shares its x,
    /// so pairs score together by construction.
    fn update_score(&mut self) {
        for obstacle in &mut self.obstacles {
            if obstacle.kind == ObstacleKind::Top
                && !obstacle.scored
                && obstacle.trailing_edge() < self.avatar_x
            {
                obstacle.scored = true;
                self.score += 1;
                log::debug!("score incremented to {}", self.score);
            }
        }
    }

    /// Clear the field and restart the random sequence
    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.score = 0;
        self.rng = Pcg32::seed_from_u64(self.seed);
    }

    /// Live obstacles, oldest (leftmost) first
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn score(&self) -> u32 {
        self.score
    }
}
