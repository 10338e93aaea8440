//! Cascade resolution - clear, fall, refill, rescan
//!
//! One round removes the current match set, compacts every column, refills the gaps
//! from the top and scans again. Rounds repeat until a scan comes back empty. The loop
//! is iterative and bounded by `max_cascade_rounds`; hitting the bound only happens
//! with pathological configurations and leaves the remaining runs on the board.
//!
//! Refills are plain uniform draws, so a refill may complete a new run immediately.
//! That is what makes chains possible.

use tracing::{debug, instrument, warn};

use crate::config::{AnimationTiming, GameConfig};
use crate::events::EventSink;
use crate::grid::Grid;
use crate::matcher::{scan, MatchSet};
use crate::rng::TileSource;
use crate::scoring::{Score, Scoring};
use crate::types::{ClearCause, GameEvent, Phase};

/// What one resolution did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Match rounds cleared (the first one included)
    pub rounds: u32,
    pub cleared: u32,
    pub fallen: u32,
    pub spawned: u32,
    pub score_delta: u32,
    /// Input lock accumulated from the phases played
    pub animation_ms: u32,
    /// The round limit stopped the cascade with runs still on the board
    pub capped: bool,
}

/// Drives one resolution sequence over borrowed session state
pub struct Resolver<'a, S: EventSink + ?Sized> {
    grid: &'a mut Grid,
    source: &'a mut TileSource,
    score: &'a mut Score,
    sink: &'a mut S,
    scoring: Scoring,
    timing: AnimationTiming,
    max_rounds: u32,
    report: CascadeReport,
}

impl<'a, S: EventSink + ?Sized> Resolver<'a, S> {
    pub fn new(
        grid: &'a mut Grid,
        source: &'a mut TileSource,
        score: &'a mut Score,
        sink: &'a mut S,
        config: &GameConfig,
    ) -> Self {
        Self {
            grid,
            source,
            score,
            sink,
            scoring: config.scoring(),
            timing: config.timing,
            max_rounds: config.max_cascade_rounds,
            report: CascadeReport::default(),
        }
    }

    pub fn grid(&self) -> &Grid {
        self.grid
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.sink.emit(event);
    }

    /// Announce a phase and account for its animation time
    pub fn enter(&mut self, phase: Phase) {
        self.report.animation_ms = self
            .report
            .animation_ms
            .saturating_add(self.timing.phase_ms(phase));
        self.sink.emit(GameEvent::PhaseChanged {
            phase,
            round: self.report.rounds,
        });
    }

    /// Remove every tile of `set` and award points for it
    ///
    /// Returns the number of tiles removed. Entries whose slot no longer holds the
    /// same tile are skipped.
    pub fn clear(&mut self, set: &MatchSet, cause: ClearCause) -> u32 {
        let mut removed = 0u32;
        for tile in set.tiles() {
            if self.grid.tile(tile.pos).map(|t| t.id) != Some(tile.id) {
                continue;
            }
            if let Some(gone) = self.grid.take(tile.pos) {
                removed += 1;
                self.sink.emit(GameEvent::Cleared { tile: gone, cause });
            }
        }
        if removed > 0 {
            let delta = self.scoring.points(cause, removed as usize);
            let score = self.score.add(delta);
            self.report.score_delta = self.report.score_delta.saturating_add(delta);
            self.sink.emit(GameEvent::ScoreChanged { score, delta });
        }
        self.report.cleared += removed;
        removed
    }

    /// Gravity followed by refill
    fn collapse_and_refill(&mut self) {
        self.enter(Phase::Falling);
        for fall in self.grid.apply_gravity() {
            self.report.fallen += 1;
            self.sink.emit(GameEvent::Fell {
                tile: fall.tile,
                from_row: fall.from_row,
                to_row: fall.to_row,
            });
        }

        self.enter(Phase::Refilling);
        for pos in self.grid.empty_positions() {
            let draw = self.source.draw();
            // Empty positions come from the grid itself, so the spawn cannot fail.
            if let Ok(tile) = self.grid.spawn(pos, draw) {
                self.report.spawned += 1;
                self.sink.emit(GameEvent::Spawned { tile });
            }
        }
    }

    /// Clear rounds until the scan is empty or the round limit is hit
    fn run(&mut self, mut matches: MatchSet) {
        while !matches.is_empty() {
            if self.report.rounds >= self.max_rounds {
                warn!(
                    rounds = self.report.rounds,
                    pending = matches.len(),
                    "cascade round limit reached, leaving runs on the board"
                );
                self.report.capped = true;
                break;
            }
            self.report.rounds += 1;
            debug!(round = self.report.rounds, tiles = matches.len(), "clearing matches");

            self.enter(Phase::Clearing);
            self.clear(&matches, ClearCause::Match);
            self.collapse_and_refill();
            matches = scan(self.grid);
        }
    }

    /// Resolve a cascade starting from `initial`
    #[instrument(skip_all, fields(initial = initial.len()))]
    pub fn resolve(mut self, initial: MatchSet) -> CascadeReport {
        self.run(initial);
        debug!(report = ?self.report, "cascade settled");
        self.report
    }

    /// Fill gaps left by a non-match removal, then cascade as usual
    pub fn settle(mut self) -> CascadeReport {
        self.collapse_and_refill();
        let matches = scan(self.grid);
        self.run(matches);
        debug!(report = ?self.report, "cascade settled");
        self.report
    }
}
