//! Book Flap entry point
//!
//! The browser build is driven from the page through `platform::web`. The
//! native binary plays headless demo runs with the autopilot and logs results.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use book_flap::collaborators::Collaborators;
    use book_flap::consts::TARGET_FRAME_MS;
    use book_flap::platform;
    use book_flap::render::LatestSink;
    use book_flap::sim::{GamePhase, autopilot_input};
    use book_flap::{Session, Settings};

    /// Demo runs to play
    const RUNS: u32 = 3;
    /// Give up on a run after this many frames (five minutes at 60 fps)
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    platform::init_logging();
    log::info!("Book Flap (native) starting...");

    let settings = Settings::load();
    let mut session = Session::new(settings, Collaborators::local());
    let mut sink = LatestSink::default();
    let mut now = 0.0;

    for run in 1..=RUNS {
        let mut frames = 0;
        // Leave GameOver, then start
        while session.state().phase != GamePhase::Running && frames < MAX_FRAMES {
            if session.state().phase == GamePhase::GameOver
                || session.state().phase == GamePhase::NotStarted
            {
                session.trigger();
            }
            session.frame(now, &mut sink);
            now += TARGET_FRAME_MS;
            frames += 1;
        }

        while session.state().phase != GamePhase::GameOver && frames < MAX_FRAMES {
            let input = autopilot_input(session.state());
            if input.trigger {
                session.trigger();
            }
            if let Some(choice) = input.choice {
                session.choose(choice);
            }
            session.frame(now, &mut sink);
            now += TARGET_FRAME_MS;
            frames += 1;
        }

        log::info!(
            "Run {run}: score {} (best {}, {} coins, {:.1}s)",
            session.state().score,
            session.state().best_score,
            session.balance(),
            frames as f64 * TARGET_FRAME_MS / 1000.0
        );
    }

    for notification in session.take_notifications() {
        log::warn!("[{}] {}", notification.service, notification.message);
    }
    session.end();
    log::info!("Presented {} frames", sink.frames);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is `platform::web::start`
}
