//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the rules of a grid-based tile-matching game: the board, match
//! detection, the two-pick swap protocol, cascade resolution and area-clear tiles.
//! It has **no dependencies** on rendering, input devices or I/O:
//!
//! - **Deterministic**: the same seed produces the same boards and refills
//! - **Synchronous**: a pick applies its whole swap/cascade sequence before returning
//! - **Observable**: every step is pushed to an [`EventSink`] as a [`GameEvent`](types::GameEvent)
//!
//! # Module Structure
//!
//! - [`grid`]: `cols x rows` slots, swaps, gravity, refill
//! - [`matcher`]: runs of three or more, move finder
//! - [`selection`]: pick protocol state machine
//! - [`cascade`]: clear / fall / refill / rescan loop
//! - [`special`]: area-clear detonation
//! - [`session`]: complete game state driven by `pick` and `tick`
//! - [`rng`]: LCG and uniform tile source
//! - [`scoring`]: points per cleared tile
//!
//! # Game Rules
//!
//! - Pick a tile, then pick a 4-adjacent tile to swap the two
//! - A swap that lines up three or more tiles of one kind clears them; otherwise it is undone
//! - Cleared tiles make room: columns fall, new tiles drop in from the top, and new
//!   runs clear in further rounds
//! - An area-clear tile destroys every tile of one kind, for double points
//!
//! # Example
//!
//! ```
//! use tile_match_core::{GameConfig, GameSession, Grid, PickOutcome};
//!
//! let grid = Grid::parse(&["AABC", "BCAB", "CABC"]).unwrap();
//! let config = GameConfig { cols: 4, rows: 3, ..GameConfig::default() };
//! let mut session = GameSession::from_grid(config, grid, 12345).unwrap();
//!
//! let mut events = Vec::new();
//! session.pick(2, 0, &mut events).unwrap();
//! let outcome = session.pick(2, 1, &mut events).unwrap();
//!
//! assert!(matches!(outcome, PickOutcome::Matched(_)));
//! assert!(session.score() >= 30);
//! ```
//!
//! # Timing
//!
//! Animations never gate correctness. Each phase of a sequence adds its duration from
//! [`AnimationTiming`] to an input lock; call [`GameSession::tick`] every frame with the
//! elapsed time to drain it. The default timing is instant.

pub mod cascade;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod matcher;
pub mod rng;
pub mod scoring;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod special;

pub use tile_match_types as types;

// Re-export commonly used types for convenience
pub use cascade::{CascadeReport, Resolver};
pub use config::{AnimationTiming, GameConfig};
pub use error::{ConfigError, GridError};
pub use events::{EventSink, NullSink};
pub use grid::{Adjacent, Fall, Grid, Slot};
pub use matcher::{find_move, has_move, scan, Hint, MatchSet};
pub use rng::{SimpleRng, TileDraw, TileSource};
pub use scoring::{Score, Scoring};
pub use selection::{PickStep, Selection};
pub use session::{GameSession, IgnoreReason, PickOutcome};
pub use snapshot::{CellSnapshot, GameSnapshot};
pub use special::{blast_set, detonate};
