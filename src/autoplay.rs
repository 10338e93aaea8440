//! Headless play: follow the move finder until it runs dry.

use tracing::debug;

use crate::core::{EventSink, GameSession, GridError, Hint, PickOutcome};
use crate::types::{GameEvent, TICK_MS};

/// Running totals over the events of a game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub cleared: u32,
    pub spawned: u32,
    pub detonations: u32,
    pub reshuffles: u32,
    /// Most match rounds seen in a single resolution
    pub longest_cascade: u32,
}

impl EventSink for Tally {
    fn emit(&mut self, event: GameEvent) {
        match event {
            GameEvent::Cleared { .. } => self.cleared += 1,
            GameEvent::Spawned { .. } => self.spawned += 1,
            GameEvent::Detonated { .. } => self.detonations += 1,
            GameEvent::Reshuffled => self.reshuffles += 1,
            GameEvent::PhaseChanged { round, .. } => {
                self.longest_cascade = self.longest_cascade.max(round);
            }
            _ => {}
        }
    }
}

/// Result of an autoplay run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Hinted moves attempted
    pub attempted: u32,
    /// Hinted swaps that did not match
    pub reverted: u32,
    pub score: u32,
    pub tally: Tally,
    /// Stopped because no move was left
    pub stuck: bool,
}

/// Tick until input unlocks or the session ends
fn drain_lock<S: EventSink + ?Sized>(session: &mut GameSession, sink: &mut S) {
    while session.is_locked() && !session.game_over() {
        session.tick(TICK_MS, sink);
    }
}

/// Play up to `max_moves` hinted moves
pub fn autoplay<S: EventSink + ?Sized>(
    session: &mut GameSession,
    max_moves: u32,
    sink: &mut S,
) -> Result<Summary, GridError> {
    let mut tally = Tally::default();
    let mut summary = Summary::default();

    while summary.attempted < max_moves && !session.game_over() {
        let Some(hint) = session.hint() else {
            summary.stuck = true;
            break;
        };
        summary.attempted += 1;

        let mut both = Fanout(&mut tally, &mut *sink);
        let outcome = match hint {
            Hint::Tap(at) => session.pick(i64::from(at.col), i64::from(at.row), &mut both)?,
            Hint::Swap(a, b) => {
                session.pick(i64::from(a.col), i64::from(a.row), &mut both)?;
                session.pick(i64::from(b.col), i64::from(b.row), &mut both)?
            }
        };
        debug!(move_no = summary.attempted, ?hint, result = outcome.as_str(), "autoplay move");
        if matches!(outcome, PickOutcome::Reverted) {
            summary.reverted += 1;
        }
        drain_lock(session, &mut both);
    }

    summary.score = session.score();
    summary.tally = tally;
    Ok(summary)
}

/// Sends every event to two sinks
struct Fanout<'a, A: ?Sized, B: ?Sized>(&'a mut A, &'a mut B);

impl<A: EventSink + ?Sized, B: EventSink + ?Sized> EventSink for Fanout<'_, A, B> {
    fn emit(&mut self, event: GameEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnimationTiming, GameConfig, NullSink};

    #[test]
    fn test_autoplay_scores() {
        let mut session = GameSession::new(GameConfig::default(), 2024).unwrap();
        let summary = autoplay(&mut session, 20, &mut NullSink).unwrap();

        assert!(summary.attempted > 0);
        assert_eq!(summary.score, session.score());
        assert!(summary.score > 0);
        assert!(summary.tally.cleared >= 3);
        assert_eq!(summary.reverted, 0);
        assert_eq!(summary.tally.cleared, summary.tally.spawned);
    }

    #[test]
    fn test_autoplay_drains_animation_lock() {
        let config = GameConfig {
            timing: AnimationTiming::STANDARD,
            ..GameConfig::default()
        };
        let mut session = GameSession::new(config, 7).unwrap();
        autoplay(&mut session, 5, &mut NullSink).unwrap();
        assert!(!session.is_locked());
    }
}
