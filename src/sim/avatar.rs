//! The player avatar: a falling body steered by voice impulses

use glam::Vec2;

use super::collision::Rect;
use crate::tuning::Tuning;

/// The avatar's physical body.
///
/// Position is the center of the bounding box, down is positive y, and the
/// only degree of freedom under voice control is vertical velocity. All
/// per-tick constants are copied out of [`Tuning`] at construction so the
/// body is self-contained for the rest of the session.
#[derive(Debug, Clone)]
pub struct Avatar {
    /// Center position
    pub pos: Vec2,
    /// Vertical velocity, down positive, in pixels per tick
    pub velocity: f32,
    /// Tilt angle in radians: negative while ascending, positive while falling
    pub rotation: f32,
    /// Bounding box size
    pub width: f32,
    pub height: f32,

    start_pos: Vec2,
    gravity: f32,
    terminal_velocity: f32,
    max_impulse: f32,
    min_impulse: f32,
    activation_threshold: f32,
    loudness_ceiling: f32,
    max_tilt: f32,
}

impl Avatar {
    pub fn new(tuning: &Tuning) -> Self {
        let start_pos = Vec2::new(tuning.avatar_x(), tuning.avatar_start_y());
        Self {
            pos: start_pos,
            velocity: 0.0,
            rotation: 0.0,
            width: tuning.avatar_width,
            height: tuning.avatar_height,
            start_pos,
            gravity: tuning.gravity,
            terminal_velocity: tuning.terminal_velocity,
            max_impulse: tuning.max_impulse,
            min_impulse: tuning.min_impulse,
            activation_threshold: tuning.activation_threshold,
            loudness_ceiling: tuning.loudness_ceiling,
            max_tilt: tuning.max_tilt(),
        }
    }

    /// Map a loudness sample to an upward impulse.
    ///
    /// Loudness at or below the activation threshold is ambient noise and
    /// does nothing. Above it, loudness is clamped to the ceiling and
    /// linearly mapped from `[threshold, ceiling]` to
    /// `[min_impulse, max_impulse]` (both negative, max the more negative).
    /// A misconfigured ceiling at or below the threshold degenerates to
    /// full strength for any qualifying sound.
    pub fn apply_voice_input(&mut self, loudness: f32) {
        if loudness <= self.activation_threshold {
            return;
        }

        let force = if self.loudness_ceiling > self.activation_threshold {
            let effective = loudness.min(self.loudness_ceiling);
            let ratio = (effective - self.activation_threshold)
                / (self.loudness_ceiling - self.activation_threshold);
            self.min_impulse + (self.max_impulse - self.min_impulse) * ratio
        } else {
            self.max_impulse
        };

        self.impulse(force);
    }

    /// Apply an instantaneous velocity override. Impulses do not stack; a
    /// later impulse replaces an in-flight one.
    pub fn impulse(&mut self, force: f32) {
        self.velocity = force;
    }

    /// Advance one fixed tick: gravity, terminal-velocity clamp, position
    /// integration, ceiling clamp, tilt.
    ///
    /// Floor contact is deliberately left to the collision resolver; only
    /// the top of the play area is enforced here so the avatar can never
    /// leave the screen upward.
    pub fn update(&mut self) {
        self.velocity += self.gravity;
        self.velocity = self
            .velocity
            .clamp(-self.terminal_velocity, self.terminal_velocity);

        self.pos.y += self.velocity;

        if self.pos.y - self.height / 2.0 < 0.0 {
            self.pos.y = self.height / 2.0;
            self.velocity = self.velocity.max(0.0);
        }

        self.update_rotation();
    }

    /// Tilt up while ascending, down while falling, scaled by how close the
    /// velocity is to the relevant extreme and capped at `max_tilt`.
    fn update_rotation(&mut self) {
        if self.velocity < 0.0 {
            let ratio = (self.velocity.abs() / self.max_impulse.abs()).min(1.0);
            self.rotation = -self.max_tilt * ratio;
        } else {
            let ratio = (self.velocity / self.terminal_velocity).min(1.0);
            self.rotation = self.max_tilt * ratio;
        }
    }

    /// Restore the initial pose
    pub fn reset(&mut self) {
        self.pos = self.start_pos;
        self.velocity = 0.0;
        self.rotation = 0.0;
    }

    /// Axis-aligned bounding box centered on the current position
    pub fn bounding_box(&self) -> Rect {
        Rect {
            x: self.pos.x - self.width / 2.0,
            y: self.pos.y - self.height / 2.0,
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn avatar() -> Avatar {
        Avatar::new(&Tuning::default())
    }

    #[test]
    fn test_free_fall_clamps_at_terminal_velocity() {
        // Scenario: gravity 0.5/tick², terminal velocity 10, no impulses.
        let mut a = avatar();
        for _ in 0..20 {
            a.update();
            assert!(a.velocity <= 10.0);
        }
        assert_eq!(a.velocity, 10.0);
        a.update();
        assert_eq!(a.velocity, 10.0);
    }

    #[test]
    fn test_loudness_above_ceiling_gives_full_impulse() {
        // Ceiling 0.2, min impulse -4.8, max impulse -8: a 0.3 sample clamps
        // to the ceiling and maps to exactly full strength.
        let mut a = avatar();
        a.apply_voice_input(0.3);
        assert_eq!(a.velocity, -8.0);
    }

    #[test]
    fn test_loudness_below_threshold_is_ignored() {
        let mut a = avatar();
        a.apply_voice_input(0.04);
        assert_eq!(a.velocity, 0.0);

        a.velocity = 5.0;
        a.apply_voice_input(0.05); // at threshold, still ambient
        assert_eq!(a.velocity, 5.0);
    }

    #[test]
    fn test_barely_qualifying_loudness_gives_min_impulse() {
        let mut a = avatar();
        a.apply_voice_input(0.050001);
        assert!((a.velocity - (-4.8)).abs() < 0.01);
    }

    #[test]
    fn test_degenerate_ceiling_falls_back_to_full_impulse() {
        let tuning = Tuning {
            loudness_ceiling: 0.05,
            activation_threshold: 0.05,
            ..Default::default()
        };
        let mut a = Avatar::new(&tuning);
        a.apply_voice_input(0.06);
        assert_eq!(a.velocity, -8.0);
    }

    #[test]
    fn test_impulse_overrides_rather_than_stacks() {
        let mut a = avatar();
        a.impulse(-8.0);
        a.impulse(-4.8);
        assert_eq!(a.velocity, -4.8);
    }

    #[test]
    fn test_ceiling_clamp_stops_upward_motion() {
        let mut a = avatar();
        a.pos.y = a.height / 2.0 + 1.0;
        a.impulse(-8.0);
        a.update();
        assert_eq!(a.pos.y, a.height / 2.0);
        assert!(a.velocity >= 0.0);
    }

    #[test]
    fn test_reset_restores_initial_pose() {
        let mut a = avatar();
        a.impulse(-8.0);
        for _ in 0..5 {
            a.update();
        }
        a.reset();
        assert_eq!(a.pos, a.start_pos);
        assert_eq!(a.velocity, 0.0);
        assert_eq!(a.rotation, 0.0);
    }

    #[test]
    fn test_bounding_box_is_centered() {
        let a = avatar();
        let bb = a.bounding_box();
        assert_eq!(bb.x + bb.width / 2.0, a.pos.x);
        assert_eq!(bb.y + bb.height / 2.0, a.pos.y);
    }

    proptest! {
        #[test]
        fn prop_speed_never_exceeds_terminal_velocity(
            impulses in prop::collection::vec(-20.0f32..0.0, 1..50),
        ) {
            let mut a = avatar();
            for force in impulses {
                a.impulse(force);
                a.update();
                prop_assert!(a.velocity.abs() <= a.terminal_velocity);
            }
        }

        #[test]
        fn prop_rotation_stays_within_max_tilt(
            samples in prop::collection::vec(0.0f32..1.0, 1..100),
        ) {
            let mut a = avatar();
            let max_tilt = a.max_tilt;
            for loudness in samples {
                a.apply_voice_input(loudness);
                a.update();
                prop_assert!(a.rotation.abs() <= max_tilt + 1e-6);
            }
        }

        #[test]
        fn prop_subthreshold_loudness_never_changes_velocity(
            loudness in 0.0f32..=0.05,
            velocity in -10.0f32..10.0,
        ) {
            let mut a = avatar();
            a.velocity = velocity;
            a.apply_voice_input(loudness);
            prop_assert_eq!(a.velocity, velocity);
        }

        #[test]
        fn prop_above_ceiling_always_full_strength(loudness in 0.2f32..10.0) {
            let mut a = avatar();
            a.apply_voice_input(loudness);
            prop_assert_eq!(a.velocity, -8.0);
        }
    }
}
