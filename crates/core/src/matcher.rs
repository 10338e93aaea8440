//! Match detection - runs of three or more same-kind tiles
//!
//! A run is found by sliding a window of [`MIN_RUN_LENGTH`] cells along every row and
//! every column. Longer runs are covered by overlapping windows; results accumulate in
//! a set keyed by tile id, so a tile that sits in both a horizontal and a vertical run
//! is reported once.
//!
//! Empty slots and area-clear tiles break runs. Scanning a grid with gaps (mid-cascade)
//! is fine and never fails.

use std::collections::BTreeMap;

use crate::grid::Grid;
use crate::types::{BombTrigger, Pos, Tile, TileId, MIN_RUN_LENGTH};

/// Distinct tiles found by one detection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    tiles: BTreeMap<TileId, Tile>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tile; returns false if it was already present
    pub fn insert(&mut self, tile: Tile) -> bool {
        self.tiles.insert(tile.id, tile).is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains_key(&id)
    }

    /// Tiles ordered by id
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.values()
    }

    pub fn positions(&self) -> Vec<Pos> {
        self.tiles().map(|tile| tile.pos).collect()
    }
}

impl FromIterator<Tile> for MatchSet {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        let mut set = MatchSet::new();
        for tile in iter {
            set.insert(tile);
        }
        set
    }
}

/// Add every full window of `line` whose tiles all match
fn collect_runs(line: &[Option<Tile>], out: &mut MatchSet) {
    for window in line.windows(MIN_RUN_LENGTH) {
        let Some(tiles) = window.iter().copied().collect::<Option<Vec<Tile>>>() else {
            continue;
        };
        if tiles.windows(2).all(|pair| pair[0].matches(&pair[1])) {
            for tile in tiles {
                out.insert(tile);
            }
        }
    }
}

/// Scan the whole grid for horizontal and vertical runs
///
/// Area-clear tiles never count towards a run, even next to two tiles of their kind.
pub fn scan(grid: &Grid) -> MatchSet {
    let mut found = MatchSet::new();
    let (cols, rows) = (grid.cols(), grid.rows());

    let mut line = Vec::with_capacity(usize::from(cols.max(rows)));
    for row in 0..rows {
        line.clear();
        line.extend((0..cols).map(|col| grid.tile(Pos::new(col, row)).copied()));
        collect_runs(&line, &mut found);
    }
    for col in 0..cols {
        line.clear();
        line.extend((0..rows).map(|row| grid.tile(Pos::new(col, row)).copied()));
        collect_runs(&line, &mut found);
    }
    found
}

/// Whether the tile at `pos` is part of a run
pub fn has_run_at(grid: &Grid, pos: Pos) -> bool {
    let Some(center) = grid.tile(pos).copied() else {
        return false;
    };
    if center.is_special() {
        return false;
    }

    let same = |col: i32, row: i32| -> bool {
        if col < 0 || row < 0 {
            return false;
        }
        grid.tile(Pos::new(col as u16, row as u16))
            .is_some_and(|tile| tile.matches(&center))
    };
    let count = |dc: i32, dr: i32| -> usize {
        let mut n = 0;
        let (mut col, mut row) = (i32::from(pos.col) + dc, i32::from(pos.row) + dr);
        while same(col, row) {
            n += 1;
            col += dc;
            row += dr;
        }
        n
    };

    let horizontal = count(-1, 0) + 1 + count(1, 0);
    let vertical = count(0, -1) + 1 + count(0, 1);
    horizontal >= MIN_RUN_LENGTH || vertical >= MIN_RUN_LENGTH
}

/// A move the player could make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// Swap two adjacent tiles
    Swap(Pos, Pos),
    /// Pick an area-clear tile
    Tap(Pos),
}

/// First available move in row-major order, if any
///
/// Area-clear tiles always count as a move: tapped directly, or swapped with any
/// neighbour, depending on `trigger`.
pub fn find_move(grid: &Grid, trigger: BombTrigger) -> Option<Hint> {
    for tile in grid.tiles().filter(|tile| tile.is_special()) {
        match trigger {
            BombTrigger::Tap => return Some(Hint::Tap(tile.pos)),
            BombTrigger::Swap => {
                if let Some(&other) = grid.neighbors(tile.pos).first() {
                    return Some(Hint::Swap(tile.pos, other));
                }
            }
        }
    }

    let mut probe = grid.clone();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let a = Pos::new(col, row);
            for b in [Pos::new(col + 1, row), Pos::new(col, row + 1)] {
                let Ok(pair) = probe.adjacent(a, b) else {
                    continue;
                };
                probe.swap(pair);
                let hit = has_run_at(&probe, a) || has_run_at(&probe, b);
                probe.swap(pair);
                if hit {
                    return Some(Hint::Swap(a, b));
                }
            }
        }
    }
    None
}

pub fn has_move(grid: &Grid, trigger: BombTrigger) -> bool {
    find_move(grid, trigger).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(layout: &[&str]) -> Grid {
        Grid::parse(layout).unwrap()
    }

    #[test]
    fn test_no_runs_returns_empty() {
        let g = grid(&["ABAB", "BABA", "ABAB", "BABA"]);
        assert!(scan(&g).is_empty());
    }

    #[test]
    fn test_horizontal_run() {
        let g = grid(&["AAAB", "BCBC"]);
        let found = scan(&g);
        assert_eq!(found.len(), 3);
        assert_eq!(
            found.positions(),
            [Pos::new(0, 0), Pos::new(1, 0), Pos::new(2, 0)]
        );
    }

    #[test]
    fn test_run_of_four_is_one_set() {
        let g = grid(&["AAAA", "BCBC"]);
        assert_eq!(scan(&g).len(), 4);
    }

    #[test]
    fn test_vertical_run() {
        let g = grid(&["AB", "AC", "AB", "BC"]);
        let found = scan(&g);
        assert_eq!(found.len(), 3);
        assert!(found.positions().iter().all(|p| p.col == 0));
    }

    #[test]
    fn test_crossing_runs_count_shared_tile_once() {
        // L-shape: row 2 and column 0 share (0, 2)
        let g = grid(&["ABC", "ACB", "AAA"]);
        let found = scan(&g);
        assert_eq!(found.len(), 5);
        let corner = g.tile(Pos::new(0, 2)).unwrap().id;
        assert!(found.contains(corner));
    }

    #[test]
    fn test_gap_breaks_run() {
        let g = grid(&["AA.A", "A.AA"]);
        assert!(scan(&g).is_empty());
    }

    #[test]
    fn test_special_tile_breaks_run() {
        let g = grid(&["AaA", "BCB"]);
        assert!(scan(&g).is_empty());
    }

    #[test]
    fn test_small_grids() {
        assert!(scan(&grid(&["AA"])).is_empty());
        assert_eq!(scan(&grid(&["AAA"])).len(), 3);
        assert_eq!(scan(&grid(&["A", "A", "A"])).len(), 3);
    }

    #[test]
    fn test_has_run_at() {
        let g = grid(&["AAAB", "BCBC"]);
        assert!(has_run_at(&g, Pos::new(1, 0)));
        assert!(!has_run_at(&g, Pos::new(3, 0)));
        assert!(!has_run_at(&g, Pos::new(0, 1)));
    }

    #[test]
    fn test_find_move_swap() {
        // Swapping (2, 0) with (2, 1) gives AAA on the top row
        let g = grid(&["AABC", "BCAB"]);
        assert_eq!(
            find_move(&g, BombTrigger::Tap),
            Some(Hint::Swap(Pos::new(2, 0), Pos::new(2, 1)))
        );
    }

    #[test]
    fn test_find_move_none() {
        let g = grid(&["AB", "BA"]);
        assert_eq!(find_move(&g, BombTrigger::Tap), None);
        assert!(!has_move(&g, BombTrigger::Swap));
    }

    #[test]
    fn test_find_move_prefers_bombs() {
        let g = grid(&["AB", "Ba"]);
        assert_eq!(find_move(&g, BombTrigger::Tap), Some(Hint::Tap(Pos::new(1, 1))));
        assert_eq!(
            find_move(&g, BombTrigger::Swap),
            Some(Hint::Swap(Pos::new(1, 1), Pos::new(1, 0)))
        );
    }

    #[test]
    fn test_find_move_leaves_grid_untouched() {
        let g = grid(&["ABAB", "BABA", "AABB"]);
        let before = g.clone();
        let _ = find_move(&g, BombTrigger::Tap);
        assert_eq!(g, before);
    }
}
