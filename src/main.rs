//! Voicewing native host
//!
//! A minimal terminal host for the simulation core: acquires the microphone,
//! runs the fixed-step loop at the canonical tick rate, and logs score and
//! game-over events. Rendering is someone else's job; this host exists to
//! exercise the full sensor-to-session pipeline end to end.

use std::time::{Duration, Instant};

use voicewing::consts::SIM_DT;
use voicewing::{CollisionMode, Game, GameEvent, GamePhase, Tuning};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mode = if std::env::args().any(|a| a == "--elastic") {
        CollisionMode::Elastic
    } else {
        CollisionMode::Lethal
    };

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut game = match Game::new(Tuning::default(), seed) {
        Ok(game) => game,
        Err(err) => {
            log::error!("tuning rejected: {err}");
            std::process::exit(1);
        }
    };

    // A failed acquisition is not fatal: the session runs with loudness
    // pinned to zero and voice control simply does nothing.
    match game.init_sensor() {
        Ok(()) => log::info!("microphone ready - make some noise to fly"),
        Err(err) => log::warn!("running without voice control: {err}"),
    }

    game.start_session(mode);
    log::info!("session running in {mode:?} mode (seed {seed})");

    let frame_duration = Duration::from_secs_f32(SIM_DT);
    let mut last = Instant::now();

    while game.phase() == GamePhase::Playing {
        std::thread::sleep(frame_duration);
        let now = Instant::now();
        game.frame(now.duration_since(last).as_secs_f32());
        last = now;

        for event in game.poll_events() {
            match event {
                GameEvent::Started => {}
                GameEvent::Scored(score) => log::info!("score: {score}"),
                GameEvent::GameOver(score) => log::info!("final score: {score}"),
            }
        }
    }

    let snapshot = game.snapshot();
    println!("game over - final score {}", snapshot.score);
}
