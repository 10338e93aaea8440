//! Game session module - owns the complete game state
//!
//! A session ties the grid, tile source, score, selection and timers together and is
//! driven by two inputs: [`GameSession::pick`] and [`GameSession::tick`]. Everything a
//! pick causes (swap, cascade, detonation, reshuffle) is applied to the grid before
//! `pick` returns. The phases it went through are queued with their animation lengths
//! and input stays locked until `tick` has drained that queue.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, info, instrument, warn};

use crate::cascade::{CascadeReport, Resolver};
use crate::config::{AnimationTiming, GameConfig};
use crate::error::{ConfigError, GridError};
use crate::events::{EventSink, NullSink};
use crate::grid::{Adjacent, Grid};
use crate::matcher::{find_move, has_move, scan, Hint};
use crate::rng::{SimpleRng, TileSource};
use crate::scoring::Score;
use crate::selection::{decide, PickStep, Selection};
use crate::snapshot::{CellSnapshot, GameSnapshot};
use crate::special;
use crate::types::*;

/// Why a pick did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A sequence is still playing out
    Locked,
    GameOver,
    EmptySlot,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::Locked => "locked",
            IgnoreReason::GameOver => "gameOver",
            IgnoreReason::EmptySlot => "emptySlot",
        }
    }
}

/// Result of a single pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    Ignored(IgnoreReason),
    Selected,
    Reselected,
    Unchanged,
    /// Adjacent swap produced a match and the cascade ran
    Matched(CascadeReport),
    /// Adjacent swap without a match, undone
    Reverted,
    Detonated(CascadeReport),
}

impl PickOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickOutcome::Ignored(_) => "ignored",
            PickOutcome::Selected => "selected",
            PickOutcome::Reselected => "reselected",
            PickOutcome::Unchanged => "unchanged",
            PickOutcome::Matched(_) => "matched",
            PickOutcome::Reverted => "reverted",
            PickOutcome::Detonated(_) => "detonated",
        }
    }

    pub fn report(&self) -> Option<&CascadeReport> {
        match self {
            PickOutcome::Matched(report) | PickOutcome::Detonated(report) => Some(report),
            _ => None,
        }
    }
}

/// Forwards events and queues every announced phase with its duration
struct LockRecorder<'a, S: EventSink + ?Sized> {
    inner: &'a mut S,
    timeline: &'a mut VecDeque<(Phase, u32)>,
    timing: AnimationTiming,
}

impl<S: EventSink + ?Sized> EventSink for LockRecorder<'_, S> {
    fn emit(&mut self, event: GameEvent) {
        if let GameEvent::PhaseChanged { phase, .. } = event {
            let ms = self.timing.phase_ms(phase);
            if ms > 0 {
                self.timeline.push_back((phase, ms));
            }
        }
        self.inner.emit(event);
    }
}

/// Shuffle a board that has no move left
///
/// Returns true if the board was reshuffled into a playable state. Every tile that
/// ended up elsewhere is reported with `Relocated`. When no attempt succeeds the
/// board is put back the way it was.
fn reshuffle_if_stuck<S: EventSink + ?Sized>(
    grid: &mut Grid,
    rng: &mut SimpleRng,
    trigger: BombTrigger,
    sink: &mut S,
) -> bool {
    if has_move(grid, trigger) {
        return false;
    }
    sink.emit(GameEvent::PhaseChanged {
        phase: Phase::Reshuffling,
        round: 0,
    });
    let before = grid.clone();
    for attempt in 1..=RESHUFFLE_ATTEMPTS {
        grid.shuffle(rng);
        if scan(grid).is_empty() && has_move(grid, trigger) {
            debug!(attempt, "board reshuffled");
            let origin: HashMap<TileId, Pos> = before.tiles().map(|t| (t.id, t.pos)).collect();
            for tile in grid.tiles() {
                if let Some(&from) = origin.get(&tile.id) {
                    if from != tile.pos {
                        sink.emit(GameEvent::Relocated { tile: *tile, from });
                    }
                }
            }
            sink.emit(GameEvent::Reshuffled);
            return true;
        }
    }
    *grid = before;
    warn!(
        attempts = RESHUFFLE_ATTEMPTS,
        "no playable arrangement found, board left without moves"
    );
    false
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    grid: Grid,
    source: TileSource,
    score: Score,
    selection: Selection,
    /// Phases still to be played out, with their remaining time
    timeline: VecDeque<(Phase, u32)>,
    remaining_ms: Option<u32>,
    /// Accepted moves (matching swaps and detonations)
    moves: u32,
    game_over: bool,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    seed: u32,
}

impl GameSession {
    /// Create a session with a freshly generated board
    pub fn new(config: GameConfig, seed: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::generate(config, seed))
    }

    /// Create a session around an existing full board
    ///
    /// The board is used as is: it is neither stabilized nor reshuffled.
    pub fn from_grid(config: GameConfig, grid: Grid, seed: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        if grid.cols() != config.cols || grid.rows() != config.rows {
            return Err(ConfigError::GridMismatch(format!(
                "grid is {}x{}, config expects {}x{}",
                grid.cols(),
                grid.rows(),
                config.cols,
                config.rows
            )));
        }
        if !grid.is_full() {
            return Err(ConfigError::GridMismatch(format!(
                "grid has {} empty slots",
                grid.empty_count()
            )));
        }
        if let Some(tile) = grid.tiles().find(|t| t.kind.index() >= config.kind_count) {
            return Err(ConfigError::GridMismatch(format!(
                "kind {} at ({}, {}) exceeds kind count {}",
                tile.kind.as_char(),
                tile.pos.col,
                tile.pos.row,
                config.kind_count
            )));
        }
        let source = TileSource::new(seed, config.kind_count, config.bomb_spawn_per_mille);
        Ok(Self::assemble(config, grid, source, seed))
    }

    fn generate(config: GameConfig, seed: u32) -> Self {
        let mut source = TileSource::new(seed, config.kind_count, config.bomb_spawn_per_mille);
        let mut grid = Grid::new(config.cols, config.rows);
        grid.fill(&mut source, config.stabilize_initial_board);
        if config.stabilize_initial_board && !scan(&grid).is_empty() {
            let settled = (0..RESHUFFLE_ATTEMPTS).any(|_| {
                grid.shuffle(source.rng_mut());
                scan(&grid).is_empty()
            });
            if !settled {
                warn!(seed, "opening board still has runs");
            }
        }
        if config.reshuffle_when_stuck {
            reshuffle_if_stuck(&mut grid, source.rng_mut(), config.bomb_trigger, &mut NullSink);
        }
        Self::assemble(config, grid, source, seed)
    }

    fn assemble(config: GameConfig, grid: Grid, source: TileSource, seed: u32) -> Self {
        let remaining_ms = match config.mode {
            SessionMode::Unlimited => None,
            SessionMode::Timed { duration_ms } => Some(duration_ms),
        };
        Self {
            config,
            grid,
            source,
            score: Score::default(),
            selection: Selection::Idle,
            timeline: VecDeque::new(),
            remaining_ms,
            moves: 0,
            game_over: false,
            episode_id: 0,
            seed,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score.value()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Phase currently playing out, `Idle` when unlocked
    pub fn phase(&self) -> Phase {
        self.timeline
            .front()
            .map_or(Phase::Idle, |&(phase, _)| phase)
    }

    pub fn is_locked(&self) -> bool {
        self.selection.is_locked()
    }

    /// Time until input unlocks
    pub fn lock_ms(&self) -> u32 {
        self.timeline
            .iter()
            .fold(0u32, |acc, &(_, ms)| acc.saturating_add(ms))
    }

    /// Time left in timed mode
    pub fn remaining_ms(&self) -> Option<u32> {
        self.remaining_ms
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// A move the player could make right now
    pub fn hint(&self) -> Option<Hint> {
        if self.game_over {
            return None;
        }
        find_move(&self.grid, self.config.bomb_trigger)
    }

    /// Pick the tile at raw coordinates `(col, row)`
    ///
    /// Out-of-bounds coordinates are rejected before anything changes. Picks while
    /// locked or after the session ended are ignored.
    #[instrument(skip(self, sink), fields(episode = self.episode_id))]
    pub fn pick<S: EventSink + ?Sized>(
        &mut self,
        col: i64,
        row: i64,
        sink: &mut S,
    ) -> Result<PickOutcome, GridError> {
        let pos = self.grid.checked_pos(col, row)?;
        if self.game_over {
            return Ok(PickOutcome::Ignored(IgnoreReason::GameOver));
        }
        let Some(&picked) = self.grid.tile(pos) else {
            return Ok(PickOutcome::Ignored(IgnoreReason::EmptySlot));
        };

        let step = decide(&self.selection, &self.grid, picked, self.config.bomb_trigger);
        debug!(?step, "pick");
        let outcome = match step {
            PickStep::Ignored => PickOutcome::Ignored(IgnoreReason::Locked),
            PickStep::Highlight(tile) => {
                self.selection = Selection::OneSelected(tile);
                sink.emit(GameEvent::Highlighted { tile });
                PickOutcome::Selected
            }
            PickStep::Unchanged => PickOutcome::Unchanged,
            PickStep::Reselect { from, to } => {
                sink.emit(GameEvent::Unhighlighted { tile: from });
                self.selection = Selection::OneSelected(to);
                sink.emit(GameEvent::Highlighted { tile: to });
                PickOutcome::Reselected
            }
            PickStep::Swap {
                first,
                second,
                pair,
            } => self.swap_tiles(first, second, pair, sink),
            PickStep::Detonate {
                bomb,
                target,
                previous,
                swap,
            } => self.trigger_bomb(bomb, target, previous, swap, sink)?,
        };
        Ok(outcome)
    }

    fn swap_tiles<S: EventSink + ?Sized>(
        &mut self,
        first: Tile,
        second: Tile,
        pair: Adjacent,
        sink: &mut S,
    ) -> PickOutcome {
        let mut out = LockRecorder {
            inner: &mut *sink,
            timeline: &mut self.timeline,
            timing: self.config.timing,
        };
        out.emit(GameEvent::Unhighlighted { tile: first });
        out.emit(GameEvent::PhaseChanged {
            phase: Phase::Swapping,
            round: 0,
        });
        self.grid.swap(pair);
        let a = Tile {
            pos: pair.b(),
            ..first
        };
        let b = Tile {
            pos: pair.a(),
            ..second
        };

        let matches = scan(&self.grid);
        let outcome = if matches.is_empty() {
            out.emit(GameEvent::Swapped {
                a,
                b,
                accepted: false,
            });
            out.emit(GameEvent::PhaseChanged {
                phase: Phase::Reverting,
                round: 0,
            });
            self.grid.swap(pair);
            out.emit(GameEvent::SwapReverted {
                a: first,
                b: second,
            });
            PickOutcome::Reverted
        } else {
            out.emit(GameEvent::Swapped {
                a,
                b,
                accepted: true,
            });
            let report = Resolver::new(
                &mut self.grid,
                &mut self.source,
                &mut self.score,
                &mut out,
                &self.config,
            )
            .resolve(matches);
            self.moves += 1;
            if self.config.reshuffle_when_stuck {
                reshuffle_if_stuck(
                    &mut self.grid,
                    self.source.rng_mut(),
                    self.config.bomb_trigger,
                    &mut out,
                );
            }
            PickOutcome::Matched(report)
        };
        self.release_or_lock(sink);
        outcome
    }

    fn trigger_bomb<S: EventSink + ?Sized>(
        &mut self,
        bomb: Tile,
        target: TileKind,
        previous: Option<Tile>,
        swap: Option<Adjacent>,
        sink: &mut S,
    ) -> Result<PickOutcome, GridError> {
        let mut out = LockRecorder {
            inner: &mut *sink,
            timeline: &mut self.timeline,
            timing: self.config.timing,
        };
        if let Some(tile) = previous {
            out.emit(GameEvent::Unhighlighted { tile });
        }

        let mut bomb_pos = bomb.pos;
        if let Some(pair) = swap {
            let before = (
                self.grid.tile(pair.a()).copied(),
                self.grid.tile(pair.b()).copied(),
            );
            out.emit(GameEvent::PhaseChanged {
                phase: Phase::Swapping,
                round: 0,
            });
            self.grid.swap(pair);
            if let (Some(x), Some(y)) = before {
                out.emit(GameEvent::Swapped {
                    a: Tile { pos: pair.b(), ..x },
                    b: Tile { pos: pair.a(), ..y },
                    accepted: true,
                });
            }
            bomb_pos = if bomb.pos == pair.a() { pair.b() } else { pair.a() };
        }

        let resolver = Resolver::new(
            &mut self.grid,
            &mut self.source,
            &mut self.score,
            &mut out,
            &self.config,
        );
        let report = special::detonate(resolver, bomb_pos, target)?;
        self.moves += 1;
        if self.config.reshuffle_when_stuck {
            reshuffle_if_stuck(
                &mut self.grid,
                self.source.rng_mut(),
                self.config.bomb_trigger,
                &mut out,
            );
        }
        self.release_or_lock(sink);
        Ok(PickOutcome::Detonated(report))
    }

    /// End of a sequence: unlock now, or stay locked until the timeline drains
    fn release_or_lock<S: EventSink + ?Sized>(&mut self, sink: &mut S) {
        if self.timeline.is_empty() {
            self.selection = Selection::Idle;
            sink.emit(GameEvent::PhaseChanged {
                phase: Phase::Idle,
                round: 0,
            });
        } else {
            self.selection = Selection::Resolving;
        }
    }

    /// Advance timers by `elapsed_ms`
    ///
    /// Drains the input lock and, in timed mode, the session clock. Returns true if
    /// the lock was released or time ran out during this tick.
    pub fn tick<S: EventSink + ?Sized>(&mut self, elapsed_ms: u32, sink: &mut S) -> bool {
        if self.game_over {
            return false;
        }
        let mut changed = false;

        if !self.timeline.is_empty() {
            let mut budget = elapsed_ms;
            while let Some(front) = self.timeline.front_mut() {
                if front.1 > budget {
                    front.1 -= budget;
                    break;
                }
                budget -= front.1;
                self.timeline.pop_front();
            }
            if self.timeline.is_empty() {
                self.release_or_lock(sink);
                changed = true;
            }
        }

        if let Some(remaining) = self.remaining_ms.as_mut() {
            *remaining = remaining.saturating_sub(elapsed_ms);
            if *remaining == 0 {
                self.game_over = true;
                info!(score = self.score.value(), moves = self.moves, "time up");
                sink.emit(GameEvent::TimeUp {
                    score: self.score.value(),
                });
                changed = true;
            }
        }
        changed
    }

    /// Start over with a new board, score and timer
    ///
    /// The tile sequence continues from the current RNG state, so a restarted
    /// session gets a different board.
    pub fn restart(&mut self) {
        let seed = self.source.seed();
        let episode_id = self.episode_id.wrapping_add(1);
        *self = Self::generate(self.config.clone(), seed);
        self.episode_id = episode_id;
        info!(episode_id, "session restarted");
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut cells = Vec::with_capacity(usize::from(self.grid.cols()) * usize::from(self.grid.rows()));
        for row in 0..self.grid.rows() {
            for col in 0..self.grid.cols() {
                let tile = self.grid.tile(Pos::new(col, row));
                cells.push(CellSnapshot {
                    kind: tile.map(|t| t.kind.index()),
                    special: tile.is_some_and(Tile::is_special),
                });
            }
        }
        GameSnapshot {
            cols: self.grid.cols(),
            rows: self.grid.rows(),
            cells,
            selected: self.selection.selected().map(|tile| tile.pos),
            phase: self.phase(),
            locked: self.is_locked(),
            score: self.score.value(),
            remaining_ms: self.remaining_ms,
            moves: self.moves,
            game_over: self.game_over,
            episode_id: self.episode_id,
            seed: self.seed,
        }
    }
}
