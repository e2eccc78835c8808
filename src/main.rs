//! Jump Cube entry point
//!
//! The browser build is driven from JavaScript through `jump_cube::web`.
//! Natively this runs a headless autopilot session and logs its progress.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::cell::Cell;
    use std::rc::Rc;

    use jump_cube::Settings;
    use jump_cube::sim::{EventKind, GameEvent, GamePhase, GameSession, autopilot};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let room = args.next().unwrap_or_else(|| "lobby".to_string());
    let turns: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(20);

    let settings = Settings {
        player_name: Some("autopilot".to_string()),
        ..Settings::load()
    };
    let mut session = GameSession::new(settings, 0.0);

    let best = Rc::new(Cell::new(0));
    {
        let best = best.clone();
        session.subscribe(EventKind::Score, move |event| {
            if let GameEvent::Score(score) = event {
                best.set(*score);
            }
        });
    }
    session.subscribe(EventKind::GameOver, |event| {
        if let GameEvent::GameOver(color) = event {
            log::warn!("Game over on block colour {}", color.to_hex());
        }
    });

    if let Err(e) = session.start(&room) {
        log::error!("Cannot start room {room}: {e}");
        std::process::exit(1);
    }
    log::info!("Jump Cube (native) autopilot in room {room}, seed {}", session.initial_seed());

    for turn in 1..=turns {
        let phase = autopilot::play_turn(&mut session, 30_000.0);
        if let Some(block) = session.chain().last() {
            log::info!(
                "Turn {turn}: score {} next block {} units along {:?}",
                session.score(),
                block.position.length().round(),
                block.axis
            );
        }
        if phase != GamePhase::Idle {
            log::warn!("Stopped in phase {phase:?}");
            break;
        }
    }

    println!("room {room}: score {}", best.get());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is jump_cube::web::init, this is just to satisfy the compiler
}
