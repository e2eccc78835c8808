//! Demo player: holds just long enough to land on the centre of the next block

use super::session::{GamePhase, GameSession};
use crate::consts::FRAME_MS;

/// Hold time (ms) that carries the hero onto the centre of the newest block
///
/// Returns `None` when no block lies ahead or the gap is beyond a full charge.
pub fn plan_hold(session: &GameSession) -> Option<f64> {
    let target = session.chain().last()?;
    let offset = target.position - session.hero().position;
    let gap = if target.axis.is_x() { offset.x } else { -offset.z };
    let settings = session.settings();
    if gap <= 0.0 || gap > settings.distance_per_ratio {
        return None;
    }
    Some(gap / settings.distance_per_ratio * settings.squat_max_ms)
}

/// Play one turn: wait for Idle, charge for the planned hold, release and
/// tick until the jump settles. Returns the phase the turn ended in.
///
/// `max_ms` bounds the simulated time spent.
pub fn play_turn(session: &mut GameSession, max_ms: f64) -> GamePhase {
    let mut elapsed = 0.0;
    while session.phase() == GamePhase::Intro && elapsed < max_ms {
        session.tick(FRAME_MS);
        elapsed += FRAME_MS;
    }
    if session.phase() != GamePhase::Idle {
        return session.phase();
    }

    let Some(hold) = plan_hold(session) else {
        log::warn!("No reachable block ahead");
        return session.phase();
    };
    session.on_input_down();
    session.tick(hold);
    session.on_input_up();
    elapsed += hold;

    while session.phase() == GamePhase::Resolving && elapsed < max_ms {
        session.tick(FRAME_MS);
        elapsed += FRAME_MS;
    }
    session.phase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;

    fn session() -> GameSession {
        let settings = Settings {
            intro: false,
            ..Settings::default()
        };
        GameSession::new(settings, 12.5)
    }

    #[test]
    fn test_opening_hold() {
        let session = session();
        // 21 units to the second block
        let hold = plan_hold(&session).unwrap();
        assert!((hold - 1050.0).abs() < 1e-9);
    }

    #[test]
    fn test_autopilot_keeps_scoring() {
        let mut session = session();
        for turn in 1..=8 {
            assert_eq!(play_turn(&mut session, 10_000.0), GamePhase::Idle);
            assert_eq!(session.score(), turn);
        }
        assert_eq!(session.chain().len(), 6);
        assert_eq!(session.chain().iter().next().map(|b| b.id), Some(4));
    }

    #[test]
    fn test_autopilot_waits_out_intro() {
        let mut session = GameSession::new(Settings::default(), 0.0);
        session.start("lobby").unwrap();
        assert_eq!(play_turn(&mut session, 10_000.0), GamePhase::Idle);
        assert_eq!(session.score(), 1);
    }
}
