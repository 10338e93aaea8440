//! Scoring module - points for cleared tiles
//!
//! - A match round awards `points_per_tile` for every tile in the match set.
//! - An area clear awards `points_per_tile * area_clear_multiplier` for every tile it
//!   destroys, the triggering tile included.
//!
//! The running score only ever grows; additions saturate instead of wrapping.

use crate::types::{ClearCause, AREA_CLEAR_MULTIPLIER, POINTS_PER_TILE};

/// Point rules for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scoring {
    pub points_per_tile: u32,
    pub area_clear_multiplier: u32,
}

impl Scoring {
    /// Points for `tiles` tiles cleared by `cause`
    pub fn points(&self, cause: ClearCause, tiles: usize) -> u32 {
        let per_tile = match cause {
            ClearCause::Match => self.points_per_tile,
            ClearCause::AreaClear => self
                .points_per_tile
                .saturating_mul(self.area_clear_multiplier),
        };
        per_tile.saturating_mul(u32::try_from(tiles).unwrap_or(u32::MAX))
    }
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            points_per_tile: POINTS_PER_TILE,
            area_clear_multiplier: AREA_CLEAR_MULTIPLIER,
        }
    }
}

/// Monotonic score counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score(u32);

impl Score {
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Add points and return the new total
    pub fn add(&mut self, points: u32) -> u32 {
        self.0 = self.0.saturating_add(points);
        self.0
    }
}
