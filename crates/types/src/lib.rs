//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data with no external dependencies, so they can be used
//! by the core logic, a renderer, or the JSON adapter alike.
//!
//! # Grid Coordinates
//!
//! - **Columns** grow left to right, starting at 0
//! - **Rows** grow top to bottom, starting at 0
//! - Gravity pulls tiles towards larger row indices
//!
//! # Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_COLS` | 8 | Grid width |
//! | `DEFAULT_ROWS` | 8 | Grid height |
//! | `DEFAULT_KIND_COUNT` | 5 | Distinct tile kinds |
//! | `POINTS_PER_TILE` | 10 | Score per matched tile |
//! | `AREA_CLEAR_MULTIPLIER` | 2 | Score multiplier for area-clear destruction |
//! | `DEFAULT_MAX_CASCADE_ROUNDS` | 1000 | Runaway cascade guard |
//!
//! # Animation Timing
//!
//! Durations are in milliseconds and only gate input, never correctness:
//!
//! | Constant | Value | Phase |
//! |----------|-------|-------|
//! | `SWAP_MS` | 200 | Swap or revert |
//! | `CLEAR_MS` | 150 | Tiles disappearing |
//! | `FALL_MS` | 150 | Gravity compaction |
//! | `SPAWN_MS` | 150 | Refill |
//!
//! # Examples
//!
//! ```
//! use tile_match_types::{Pos, TileKind, BombTrigger, DEFAULT_COLS};
//!
//! let kind = TileKind::from_char('c').unwrap();
//! assert_eq!(kind.index(), 2);
//! assert_eq!(kind.as_char(), 'C');
//!
//! assert!(Pos::new(3, 4).is_adjacent(Pos::new(3, 5)));
//! assert!(!Pos::new(3, 4).is_adjacent(Pos::new(4, 5)));
//!
//! assert_eq!(BombTrigger::from_str("swap"), Some(BombTrigger::Swap));
//! assert_eq!(DEFAULT_COLS, 8);
//! ```

/// Default grid width in columns
pub const DEFAULT_COLS: u16 = 8;

/// Default grid height in rows
pub const DEFAULT_ROWS: u16 = 8;

/// Largest supported grid side
pub const MAX_GRID_DIM: u16 = 64;

/// Default number of tile kinds
pub const DEFAULT_KIND_COUNT: u8 = 5;

/// Fewer kinds than this guarantees an endless cascade
pub const MIN_KIND_COUNT: u8 = 2;

/// One letter per kind (A-Z)
pub const MAX_KIND_COUNT: u8 = 26;

/// Minimum run length that counts as a match
pub const MIN_RUN_LENGTH: usize = 3;

/// Points awarded per tile removed by a match
pub const POINTS_PER_TILE: u32 = 10;

/// Area-clear destruction awards `POINTS_PER_TILE * AREA_CLEAR_MULTIPLIER` per tile
pub const AREA_CLEAR_MULTIPLIER: u32 = 2;

/// Upper bound on clear rounds within a single resolution
pub const DEFAULT_MAX_CASCADE_ROUNDS: u32 = 1000;

/// Attempts made to shuffle a board with no available move
pub const RESHUFFLE_ATTEMPTS: u32 = 100;

/// Suggested fixed timestep for callers driving `tick` (~60 FPS)
pub const TICK_MS: u32 = 16;

/// Swap / revert animation length
pub const SWAP_MS: u32 = 200;

/// Clear animation length
pub const CLEAR_MS: u32 = 150;

/// Gravity animation length
pub const FALL_MS: u32 = 150;

/// Refill animation length
pub const SPAWN_MS: u32 = 150;

/// Tile kind: an index into the session's fixed kind set
///
/// Kinds are rendered as letters `A..Z`; colours and sprites are the renderer's
/// business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileKind(u8);

impl TileKind {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// Letter representation (`A` for index 0)
    pub fn as_char(self) -> char {
        if self.0 < MAX_KIND_COUNT {
            (b'A' + self.0) as char
        } else {
            '?'
        }
    }

    /// Parse a kind letter (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_match_types::TileKind;
    ///
    /// assert_eq!(TileKind::from_char('A'), Some(TileKind::new(0)));
    /// assert_eq!(TileKind::from_char('e'), Some(TileKind::new(4)));
    /// assert_eq!(TileKind::from_char('.'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Some(Self(upper as u8 - b'A'))
        } else {
            None
        }
    }
}

/// Stable tile handle, unique for the lifetime of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(pub u32);

/// Grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub col: u16,
    pub row: u16,
}

impl Pos {
    pub const fn new(col: u16, row: u16) -> Self {
        Self { col, row }
    }

    /// Manhattan distance between two positions
    pub fn distance(self, other: Pos) -> u32 {
        u32::from(self.col.abs_diff(other.col)) + u32::from(self.row.abs_diff(other.row))
    }

    /// True if exactly one axis differs, by exactly one
    pub fn is_adjacent(self, other: Pos) -> bool {
        self.distance(other) == 1
    }
}

/// Special-effect tag carried by a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Special {
    /// Destroys every tile of a chosen kind when triggered
    AreaClear,
}

/// A movable game piece
///
/// `pos` always equals the grid slot holding the tile. For an area-clear tile,
/// `kind` is the target kind assigned at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub id: TileId,
    pub kind: TileKind,
    pub pos: Pos,
    pub special: Option<Special>,
}

impl Tile {
    pub fn is_special(&self) -> bool {
        self.special.is_some()
    }

    /// Whether this tile can take part in a three-in-a-row run with `other`
    pub fn matches(&self, other: &Tile) -> bool {
        !self.is_special() && !other.is_special() && self.kind == other.kind
    }
}

/// Session length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Play until the caller stops
    Unlimited,
    /// Session ends once `duration_ms` of ticks have elapsed
    Timed { duration_ms: u32 },
}

/// How an area-clear tile is activated
///
/// - **Tap**: picking the tile detonates it immediately
/// - **Swap**: the tile must be swapped with an adjacent tile, whose kind becomes the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BombTrigger {
    Tap,
    Swap,
}

impl BombTrigger {
    /// Parse trigger from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tap" => Some(BombTrigger::Tap),
            "swap" => Some(BombTrigger::Swap),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BombTrigger::Tap => "tap",
            BombTrigger::Swap => "swap",
        }
    }
}

/// Resolution step currently being played out
///
/// Each grid-mutating step is announced before its events are emitted, so a renderer
/// can queue one animation per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Swapping,
    Reverting,
    Clearing,
    Detonating,
    Falling,
    Refilling,
    Reshuffling,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Swapping => "swapping",
            Phase::Reverting => "reverting",
            Phase::Clearing => "clearing",
            Phase::Detonating => "detonating",
            Phase::Falling => "falling",
            Phase::Refilling => "refilling",
            Phase::Reshuffling => "reshuffling",
        }
    }
}

/// Why a tile left the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClearCause {
    Match,
    AreaClear,
}

impl ClearCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClearCause::Match => "match",
            ClearCause::AreaClear => "areaClear",
        }
    }
}

/// Side-effect notification for the renderer
///
/// Tiles are copies taken at the moment of the event; positions reflect the state
/// right after the step (`Swapped` carries the swapped positions, `SwapReverted`
/// the restored ones).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Highlighted { tile: Tile },
    Unhighlighted { tile: Tile },
    Swapped { a: Tile, b: Tile, accepted: bool },
    SwapReverted { a: Tile, b: Tile },
    PhaseChanged { phase: Phase, round: u32 },
    Cleared { tile: Tile, cause: ClearCause },
    Fell { tile: Tile, from_row: u16, to_row: u16 },
    Spawned { tile: Tile },
    ScoreChanged { score: u32, delta: u32 },
    Detonated { bomb: Tile, target: TileKind },
    /// A reshuffle moved `tile` from `from` to `tile.pos`
    Relocated { tile: Tile, from: Pos },
    /// Sent after the `Relocated` events of a successful reshuffle
    Reshuffled,
    TimeUp { score: u32 },
}

impl GameEvent {
    /// camelCase event name used by the adapter protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            GameEvent::Highlighted { .. } => "highlighted",
            GameEvent::Unhighlighted { .. } => "unhighlighted",
            GameEvent::Swapped { .. } => "swapped",
            GameEvent::SwapReverted { .. } => "swapReverted",
            GameEvent::PhaseChanged { .. } => "phaseChanged",
            GameEvent::Cleared { .. } => "cleared",
            GameEvent::Fell { .. } => "fell",
            GameEvent::Spawned { .. } => "spawned",
            GameEvent::ScoreChanged { .. } => "scoreChanged",
            GameEvent::Detonated { .. } => "detonated",
            GameEvent::Relocated { .. } => "relocated",
            GameEvent::Reshuffled => "reshuffled",
            GameEvent::TimeUp { .. } => "timeUp",
        }
    }
}
