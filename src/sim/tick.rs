//! Fixed timestep tick pipeline
//!
//! One tick runs to completion before the next is scheduled; nothing inside
//! suspends. The loudness sample is polled by the caller and passed in, so
//! the pipeline itself stays pure and deterministic.

use super::collision::resolve;
use super::session::{GameEvent, GamePhase, Session};

/// Advance the session by one fixed tick.
///
/// Order is fixed: voice input, avatar physics, obstacle advancement,
/// score-delta detection, collision resolution. Outside `Playing` the
/// session is frozen and the call is a no-op.
pub fn tick(session: &mut Session, loudness: f32, events: &mut Vec<GameEvent>) {
    if session.phase != GamePhase::Playing {
        return;
    }

    session.time_ticks += 1;

    session.avatar.apply_voice_input(loudness);
    session.avatar.update();
    session.field.update();

    let score = session.field.score();
    if score > session.score {
        session.score = score;
        events.push(GameEvent::Scored(score));
    }

    let terminal = resolve(
        &mut session.avatar,
        session.field.obstacles(),
        session.floor_y,
        session.mode,
    );
    if terminal {
        session.phase = GamePhase::GameOver;
        events.push(GameEvent::GameOver(session.score));
        log::info!(
            "game over after {} ticks, final score {}",
            session.time_ticks,
            session.score
        );
    }
}
