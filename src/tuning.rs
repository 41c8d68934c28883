//! Data-driven game balance
//!
//! All gameplay numbers live in one deserializable table so a host can load
//! overrides (from a file, a query string, whatever) without touching the
//! simulation. Defaults reproduce the original feel. Distances are in pixels,
//! rates in per-tick units at the canonical 60 Hz step.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Precondition violations caught at session start.
///
/// The generator and resolver have no recoverable runtime errors; a tuning
/// table that cannot produce a playable session is rejected up front instead
/// of being defended against per tick.
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("obstacle gap {gap} plus margins {margins} does not fit play height {play_height}")]
    GapTooLarge {
        gap: f32,
        margins: f32,
        play_height: f32,
    },
    #[error("avatar {avatar} does not fit inside the obstacle gap {gap}")]
    AvatarTooLarge { avatar: f32, gap: f32 },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("impulses must be upward (negative): min {min_impulse}, max {max_impulse}")]
    ImpulseNotUpward { min_impulse: f32, max_impulse: f32 },
}

/// Game balance values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Play area width in pixels
    pub play_width: f32,
    /// Play area height in pixels (the floor sits at this y)
    pub play_height: f32,

    // === Avatar physics ===
    /// Gravity acceleration per tick (down is positive)
    pub gravity: f32,
    /// Terminal (maximum falling) velocity per tick
    pub terminal_velocity: f32,
    /// Full-strength upward impulse (negative = up)
    pub max_impulse: f32,
    /// Weakest impulse a barely-qualifying sound produces
    pub min_impulse: f32,
    /// Loudness below this is treated as ambient noise and ignored
    pub activation_threshold: f32,
    /// Loudness at or above this maps to `max_impulse`
    pub loudness_ceiling: f32,
    /// Maximum tilt angle in degrees (ascending or descending)
    pub max_tilt_degrees: f32,
    /// Avatar bounding box
    pub avatar_width: f32,
    pub avatar_height: f32,

    // === Obstacles ===
    /// Shared width of every obstacle
    pub obstacle_width: f32,
    /// Vertical gap between the members of a pair
    pub obstacle_gap: f32,
    /// Leftward advance per tick
    pub obstacle_speed: f32,
    /// Horizontal distance between consecutive pairs
    pub spawn_spacing: f32,
    /// Minimum clearance between the gap and the top play-area edge
    pub gap_margin_top: f32,
    /// Minimum clearance between the gap and the floor
    pub gap_margin_bottom: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            play_width: 800.0,
            play_height: 400.0,

            gravity: 0.5,
            terminal_velocity: 10.0,
            max_impulse: -8.0,
            min_impulse: -4.8,
            activation_threshold: 0.05,
            loudness_ceiling: 0.2,
            max_tilt_degrees: 45.0,
            avatar_width: 30.0,
            avatar_height: 20.0,

            obstacle_width: 60.0,
            obstacle_gap: 150.0,
            obstacle_speed: 2.0,
            spawn_spacing: 250.0,
            gap_margin_top: 50.0,
            gap_margin_bottom: 100.0,
        }
    }
}

impl Tuning {
    /// The avatar's fixed horizontal position (a quarter of the way in).
    /// Scoring uses the same x, so the two can never disagree.
    pub fn avatar_x(&self) -> f32 {
        self.play_width / 4.0
    }

    /// The avatar's starting vertical position
    pub fn avatar_start_y(&self) -> f32 {
        self.play_height / 2.0
    }

    /// Maximum tilt in radians
    pub fn max_tilt(&self) -> f32 {
        self.max_tilt_degrees.to_radians()
    }

    /// Validate session-start preconditions
    pub fn validate(&self) -> Result<(), TuningError> {
        for (name, value) in [
            ("play_width", self.play_width),
            ("play_height", self.play_height),
            ("gravity", self.gravity),
            ("terminal_velocity", self.terminal_velocity),
            ("obstacle_width", self.obstacle_width),
            ("obstacle_gap", self.obstacle_gap),
            ("obstacle_speed", self.obstacle_speed),
            ("spawn_spacing", self.spawn_spacing),
            ("avatar_width", self.avatar_width),
            ("avatar_height", self.avatar_height),
        ] {
            if value <= 0.0 {
                return Err(TuningError::NonPositive { name, value });
            }
        }

        if self.max_impulse >= 0.0 || self.min_impulse >= 0.0 {
            return Err(TuningError::ImpulseNotUpward {
                min_impulse: self.min_impulse,
                max_impulse: self.max_impulse,
            });
        }

        let margins = self.gap_margin_top + self.gap_margin_bottom;
        if self.obstacle_gap + margins >= self.play_height {
            return Err(TuningError::GapTooLarge {
                gap: self.obstacle_gap,
                margins,
                play_height: self.play_height,
            });
        }

        if self.avatar_height >= self.obstacle_gap {
            return Err(TuningError::AvatarTooLarge {
                avatar: self.avatar_height,
                gap: self.obstacle_gap,
            });
        }

        Ok(())
    }
}
