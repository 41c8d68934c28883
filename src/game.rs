//! Orchestrator: owns the sensor and the session, drives the tick loop
//!
//! The host calls [`Game::frame`] once per redraw with the elapsed wall
//! time; a fixed-timestep accumulator converts that into whole simulation
//! ticks. The loudness sensor runs concurrently on the audio thread and is
//! polled once per tick through its atomic cell.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sensor::{LoudnessSensor, SensorError};
use crate::sim::{CollisionMode, GameEvent, GamePhase, Session, Snapshot, tick};
use crate::tuning::{Tuning, TuningError};

/// The game orchestrator and the host's only control surface.
///
/// Lifecycle: `Ready -> Playing` via [`Game::start_session`],
/// `Playing -> GameOver` only through a lethal terminal collision,
/// `GameOver -> Ready` via [`Game::restart_session`]. Elastic sessions never
/// end by collision.
pub struct Game {
    tuning: Tuning,
    seed: u64,
    sensor: Option<LoudnessSensor>,
    session: Session,
    accumulator: f32,
    events: Vec<GameEvent>,
}

impl Game {
    /// Validate the tuning table and build an idle game.
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;
        let session = Session::new(&tuning, CollisionMode::default(), seed, 0);
        Ok(Self {
            tuning,
            seed,
            sensor: None,
            session,
            accumulator: 0.0,
            events: Vec::new(),
        })
    }

    /// Acquire the microphone, once. On failure the game stays playable
    /// with loudness pinned to zero; the error is returned so the host can
    /// tell the player why voice control is dead.
    pub fn init_sensor(&mut self) -> Result<(), SensorError> {
        if self.sensor.is_some() {
            return Ok(());
        }
        match LoudnessSensor::init() {
            Ok(sensor) => {
                self.sensor = Some(sensor);
                Ok(())
            }
            Err(err) => {
                log::warn!("voice control disabled: {err}");
                Err(err)
            }
        }
    }

    /// Swap in a new tuning table for subsequent sessions.
    pub fn set_tuning(&mut self, tuning: Tuning) -> Result<(), TuningError> {
        tuning.validate()?;
        self.tuning = tuning;
        Ok(())
    }

    /// Ready -> Playing: construct a fresh session as one value (avatar,
    /// obstacles, and score reset together, generation bumped so any stale
    /// frame work can detect itself) and start loudness sampling.
    pub fn start_session(&mut self, mode: CollisionMode) {
        let generation = self.session.generation + 1;
        self.session = Session::new(&self.tuning, mode, self.seed, generation);
        self.session.phase = GamePhase::Playing;
        self.accumulator = 0.0;
        self.events.clear();
        self.events.push(GameEvent::Started);

        if let Some(sensor) = &self.sensor {
            sensor.start_sampling();
        }
        log::info!("session {generation} started in {mode:?} mode");
    }

    /// GameOver -> Ready (or abandon a running session): stop sampling,
    /// drop any accumulated tick debt so no stale step touches the fresh
    /// session, and build an idle one.
    pub fn restart_session(&mut self) {
        if let Some(sensor) = &self.sensor {
            sensor.stop_sampling();
        }
        let generation = self.session.generation + 1;
        let mode = self.session.mode;
        self.session = Session::new(&self.tuning, mode, self.seed, generation);
        self.accumulator = 0.0;
        self.events.clear();
        log::info!("session reset to ready");
    }

    /// Advance the simulation by `elapsed` seconds of wall time, running as
    /// many whole fixed ticks as fit (capped to avoid a spiral of death
    /// after a long frame).
    pub fn frame(&mut self, elapsed: f32) {
        if self.session.phase != GamePhase::Playing {
            return;
        }

        self.accumulator += elapsed.min(0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let loudness = self.current_loudness();
            tick(&mut self.session, loudness, &mut self.events);
            self.accumulator -= SIM_DT;
            substeps += 1;

            if self.session.phase == GamePhase::GameOver {
                // Simulation and final score freeze; sampling stops so no
                // stale loudness survives into the next session.
                if let Some(sensor) = &self.sensor {
                    sensor.stop_sampling();
                }
                self.accumulator = 0.0;
                break;
            }
        }
    }

    /// Latest loudness sample; zero when no sensor was acquired or sampling
    /// is stopped.
    pub fn current_loudness(&self) -> f32 {
        self.sensor
            .as_ref()
            .map_or(0.0, LoudnessSensor::current_loudness)
    }

    /// Drain the events produced since the last call.
    pub fn poll_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view for rendering/UI collaborators.
    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot()
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    pub fn generation(&self) -> u64 {
        self.session.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        // No sensor acquired: loudness reads as zero, exactly the degraded
        // mode the game must stay playable in.
        Game::new(Tuning::default(), 99).expect("default tuning is valid")
    }

    #[test]
    fn test_invalid_tuning_rejected_at_construction() {
        let bad = Tuning {
            obstacle_gap: 500.0,
            ..Default::default()
        };
        assert!(Game::new(bad, 1).is_err());
    }

    #[test]
    fn test_starts_ready_and_silent() {
        let g = game();
        assert_eq!(g.phase(), GamePhase::Ready);
        assert_eq!(g.current_loudness(), 0.0);
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn test_frame_is_inert_while_ready() {
        let mut g = game();
        g.frame(1.0);
        assert_eq!(g.phase(), GamePhase::Ready);
        assert!(g.poll_events().is_empty());
        assert!(g.snapshot().obstacles.is_empty());
    }

    #[test]
    fn test_start_session_emits_started_and_plays() {
        let mut g = game();
        g.start_session(CollisionMode::Lethal);
        assert_eq!(g.phase(), GamePhase::Playing);
        assert_eq!(g.poll_events(), vec![GameEvent::Started]);
        assert_eq!(g.generation(), 1);
    }

    #[test]
    fn test_silent_lethal_session_reaches_game_over() {
        let mut g = game();
        g.start_session(CollisionMode::Lethal);
        for _ in 0..200 {
            g.frame(SIM_DT);
            if g.phase() == GamePhase::GameOver {
                break;
            }
        }
        assert_eq!(g.phase(), GamePhase::GameOver);
        let events = g.poll_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::GameOver(_)))
        );

        // Frozen: further frames change nothing.
        let score = g.score();
        g.frame(1.0);
        assert_eq!(g.phase(), GamePhase::GameOver);
        assert_eq!(g.score(), score);
    }

    #[test]
    fn test_restart_returns_to_ready_with_fresh_session() {
        let mut g = game();
        g.start_session(CollisionMode::Lethal);
        for _ in 0..200 {
            g.frame(SIM_DT);
        }
        assert_eq!(g.phase(), GamePhase::GameOver);
        let generation = g.generation();

        g.restart_session();
        assert_eq!(g.phase(), GamePhase::Ready);
        assert_eq!(g.score(), 0);
        assert_eq!(g.generation(), generation + 1);
        // Transient events from the dead session are gone.
        assert!(g.poll_events().is_empty());
    }

    #[test]
    fn test_frame_caps_substeps() {
        let mut g = game();
        g.start_session(CollisionMode::Elastic);
        g.poll_events();
        // A huge frame must not run unbounded ticks.
        g.frame(10.0);
        assert!(g.session.time_ticks <= MAX_SUBSTEPS as u64);
    }

    #[test]
    fn test_successive_sessions_differ() {
        let mut g = game();
        g.start_session(CollisionMode::Elastic);
        for _ in 0..600 {
            g.frame(SIM_DT);
        }
        let first: Vec<f32> = g.snapshot().obstacles.iter().map(|o| o.height).collect();

        g.restart_session();
        g.start_session(CollisionMode::Elastic);
        for _ in 0..600 {
            g.frame(SIM_DT);
        }
        let second: Vec<f32> = g.snapshot().obstacles.iter().map(|o| o.height).collect();
        assert_ne!(first, second);
    }
}
