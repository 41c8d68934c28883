//! Voicewing - a voice-controlled side-scrolling avatar game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (avatar physics, obstacles, collisions, session)
//! - `sensor`: Microphone loudness sensing (cpal capture stream)
//! - `tuning`: Data-driven game balance
//! - `game`: Orchestrator wiring the sensor and the simulation together
//!
//! Rendering, UI, and sound playback are external consumers: they read the
//! per-tick [`sim::Snapshot`] and react to [`sim::GameEvent`]s, nothing more.

pub mod game;
pub mod sensor;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use sensor::{LoudnessSensor, SensorError};
pub use sim::{CollisionMode, GameEvent, GamePhase, Snapshot};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Canonical simulation tick rate. Physics constants are in per-tick
    /// units, so this rate is part of the game's feel, not just a scheduler
    /// detail (see DESIGN.md on the fixed-step decision).
    pub const TICK_RATE: f32 = 60.0;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Number of recent mono samples the loudness RMS window covers
    pub const LOUDNESS_WINDOW: usize = 256;
}
