//! Slice Rush entry point
//!
//! Runs a headless autopilot session: `slice-rush [seed] [tuning.json]`.
//! Sounds and effects are logged (set `RUST_LOG=debug` to see them) and a JSON
//! summary of the final frame is printed when the run ends.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use slice_rush::audio::{AudioManager, LogBackend};
    use slice_rush::consts::*;
    use slice_rush::sim::{Autopilot, FrameClock, Game, GameEvent};
    use slice_rush::{Settings, Tuning};

    /// Longest session before the autopilot gives up
    const SESSION_SECS: f32 = 180.0;
    /// Simulated host frame time (30 fps host, 60 Hz sim)
    const HOST_FRAME: f32 = 1.0 / 30.0;
    const SETTINGS_PATH: &str = "slice_rush_settings.json";

    fn seed_from_clock() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn log_event(event: &GameEvent, settings: &Settings) {
        match event {
            GameEvent::Spawned { kind, launch, .. } => {
                log::debug!("Spawned {:?} at {:.0?}", kind, launch.pos)
            }
            GameEvent::Effect { kind, pos, .. } if settings.particles => {
                log::debug!("Effect {:?} at {:.0?}", kind, pos)
            }
            GameEvent::ScoreChanged(score) => log::debug!("Score: {score}"),
            GameEvent::LifeLost { remaining, .. } => log::info!("Missed! {remaining} lives left"),
            GameEvent::GameOver { by_bomb } => {
                log::info!("GAME OVER{}", if *by_bomb { " - sliced a bomb" } else { "" })
            }
            _ => {}
        }
    }

    pub fn run() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let mut args = std::env::args().skip(1);
        let seed = args
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(seed_from_clock);
        let tuning = match args.next() {
            Some(path) => Tuning::load(&path).unwrap_or_else(|err| {
                log::warn!("Ignoring tuning file: {err}");
                Tuning::default()
            }),
            None => Tuning::default(),
        };
        let settings = Settings::load(SETTINGS_PATH).unwrap_or_else(|err| {
            log::warn!("Ignoring settings file: {err}");
            Settings::default()
        });

        log::info!("Slice Rush (headless) starting...");
        let mut audio = AudioManager::new(LogBackend::default(), &settings);
        let mut game = Game::new(seed, tuning);
        let mut pilot = Autopilot::default();
        let mut clock = FrameClock::default();
        game.start();

        let frames = (SESSION_SECS / HOST_FRAME) as u32;
        for _ in 0..frames {
            for _ in 0..clock.steps(HOST_FRAME) {
                pilot.drive(&mut game, SIM_DT);
                game.tick(SIM_DT);
            }
            for event in game.drain_events() {
                audio.handle(&event);
                log_event(&event, &settings);
            }
            if game.state.ended {
                break;
            }
        }

        if !game.state.ended {
            log::info!("Session time limit reached");
        }
        log::info!(
            "Final score {} with {} swipes over {:.1}s",
            game.state.score,
            pilot.swipes(),
            game.now()
        );
        match serde_json::to_string_pretty(&game.snapshot()) {
            Ok(json) => println!("{json}"),
            Err(err) => log::error!("Failed to serialize snapshot: {err}"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web hosts drive `slice_rush::sim::Game` directly
}
