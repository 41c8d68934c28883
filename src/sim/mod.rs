//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (per-tick physics units, see DESIGN.md)
//! - Seeded RNG only
//! - No sensing, scheduling, or platform dependencies

pub mod avatar;
pub mod collision;
pub mod obstacles;
pub mod session;
pub mod tick;

pub use avatar::Avatar;
pub use collision::{CollisionMode, Rect, resolve};
pub use obstacles::{Obstacle, ObstacleField, ObstacleKind};
pub use session::{AvatarPose, GameEvent, GamePhase, Session, Snapshot};
pub use tick::tick;
