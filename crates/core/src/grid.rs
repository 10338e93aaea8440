//! Grid module - owns the tile slots
//!
//! The grid is a `cols x rows` array of slots stored row-major in one flat vector.
//! Each slot is either empty or holds exactly one tile, and every tile records the
//! position of the slot that holds it. All mutation goes through methods that keep
//! those two views consistent.
//!
//! Coordinates: (col, row) where row 0 is the top. Gravity pulls towards the bottom.

use std::fmt;

use arrayvec::ArrayVec;
use tracing::debug;

use crate::error::GridError;
use crate::rng::{SimpleRng, TileDraw, TileSource};
use crate::types::{Pos, Special, Tile, TileId, TileKind};

/// Contents of one grid cell
pub type Slot = Option<Tile>;

/// Two in-bounds positions that share an edge
///
/// Only [`Grid::adjacent`] hands these out, so [`Grid::swap`] never sees a bad pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Adjacent {
    a: Pos,
    b: Pos,
}

impl Adjacent {
    pub fn a(&self) -> Pos {
        self.a
    }

    pub fn b(&self) -> Pos {
        self.b
    }
}

/// A tile moved by gravity; `tile.pos` is already the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub tile: Tile,
    pub from_row: u16,
    pub to_row: u16,
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: u16,
    rows: u16,
    /// Row-major slots (row * cols + col)
    slots: Vec<Slot>,
    next_id: u32,
}

impl Grid {
    /// Create a grid with every slot empty
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            slots: vec![None; usize::from(cols) * usize::from(rows)],
            next_id: 0,
        }
    }

    /// Build a grid from text rows
    ///
    /// Upper-case letters are plain tiles, lower-case letters are area-clear tiles
    /// of that kind, `.` is an empty slot.
    ///
    /// ```
    /// use tile_match_core::Grid;
    /// use tile_match_core::types::{Pos, TileKind};
    ///
    /// let grid = Grid::parse(&["AB", "bA"]).unwrap();
    /// assert_eq!(grid.cols(), 2);
    /// assert_eq!(grid.tile(Pos::new(1, 0)).unwrap().kind, TileKind::new(1));
    /// assert!(grid.tile(Pos::new(0, 1)).unwrap().is_special());
    /// ```
    pub fn parse(layout: &[&str]) -> Result<Self, GridError> {
        let rows = layout.len();
        let cols = layout.first().map_or(0, |row| row.chars().count());
        if rows == 0 || cols == 0 {
            return Err(GridError::Malformed("empty layout".to_string()));
        }
        let (Ok(cols16), Ok(rows16)) = (u16::try_from(cols), u16::try_from(rows)) else {
            return Err(GridError::Malformed("layout too large".to_string()));
        };

        let mut grid = Grid::new(cols16, rows16);
        for (row, line) in layout.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(GridError::Malformed(format!(
                    "row {} has {} cells, expected {}",
                    row,
                    line.chars().count(),
                    cols
                )));
            }
            for (col, c) in line.chars().enumerate() {
                if c == '.' {
                    continue;
                }
                let kind = TileKind::from_char(c).ok_or_else(|| {
                    GridError::Malformed(format!("unexpected character {:?}", c))
                })?;
                let special = c.is_ascii_lowercase().then_some(Special::AreaClear);
                grid.spawn(Pos::new(col as u16, row as u16), TileDraw { kind, special })?;
            }
        }
        Ok(grid)
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Flat index for an in-bounds position
    #[inline(always)]
    fn index(&self, pos: Pos) -> Option<usize> {
        if pos.col >= self.cols || pos.row >= self.rows {
            return None;
        }
        Some(usize::from(pos.row) * usize::from(self.cols) + usize::from(pos.col))
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        self.index(pos).is_some()
    }

    /// Validate raw input coordinates
    pub fn checked_pos(&self, col: i64, row: i64) -> Result<Pos, GridError> {
        let inside = (0..i64::from(self.cols)).contains(&col) && (0..i64::from(self.rows)).contains(&row);
        if !inside {
            return Err(GridError::OutOfBounds { col, row });
        }
        Ok(Pos::new(col as u16, row as u16))
    }

    /// Slot at `pos`; `None` if out of bounds
    pub fn get(&self, pos: Pos) -> Option<Slot> {
        self.index(pos).map(|idx| self.slots[idx])
    }

    /// Tile at `pos`, if any
    pub fn tile(&self, pos: Pos) -> Option<&Tile> {
        self.index(pos).and_then(|idx| self.slots[idx].as_ref())
    }

    /// Replace the slot at `pos`, returning its previous content
    ///
    /// A placed tile has its position rewritten to `pos`.
    pub fn set(&mut self, pos: Pos, slot: Slot) -> Result<Slot, GridError> {
        let idx = self.index(pos).ok_or_else(|| GridError::out_of_bounds(pos))?;
        let placed = slot.map(|tile| Tile { pos, ..tile });
        Ok(std::mem::replace(&mut self.slots[idx], placed))
    }

    /// Empty the slot at `pos`, returning the removed tile
    pub fn take(&mut self, pos: Pos) -> Option<Tile> {
        let idx = self.index(pos)?;
        self.slots[idx].take()
    }

    /// Create a new tile with a fresh id at `pos`
    pub fn spawn(&mut self, pos: Pos, draw: TileDraw) -> Result<Tile, GridError> {
        let idx = self.index(pos).ok_or_else(|| GridError::out_of_bounds(pos))?;
        let tile = Tile {
            id: TileId(self.next_id),
            kind: draw.kind,
            pos,
            special: draw.special,
        };
        self.next_id = self.next_id.wrapping_add(1);
        self.slots[idx] = Some(tile);
        Ok(tile)
    }

    /// Both positions in bounds and sharing an edge
    pub fn are_adjacent(&self, a: Pos, b: Pos) -> bool {
        self.in_bounds(a) && self.in_bounds(b) && a.is_adjacent(b)
    }

    /// Validate a swap pair
    pub fn adjacent(&self, a: Pos, b: Pos) -> Result<Adjacent, GridError> {
        for pos in [a, b] {
            if !self.in_bounds(pos) {
                return Err(GridError::out_of_bounds(pos));
            }
        }
        if !a.is_adjacent(b) {
            return Err(GridError::InvalidMove { a, b });
        }
        Ok(Adjacent { a, b })
    }

    /// Exchange two adjacent slots and update both tiles' positions
    pub fn swap(&mut self, pair: Adjacent) {
        let (Some(ia), Some(ib)) = (self.index(pair.a), self.index(pair.b)) else {
            return;
        };
        self.slots.swap(ia, ib);
        if let Some(tile) = self.slots[ia].as_mut() {
            tile.pos = pair.a;
        }
        if let Some(tile) = self.slots[ib].as_mut() {
            tile.pos = pair.b;
        }
    }

    /// Validate and swap in one step
    pub fn try_swap(&mut self, a: Pos, b: Pos) -> Result<Adjacent, GridError> {
        let pair = self.adjacent(a, b)?;
        self.swap(pair);
        Ok(pair)
    }

    /// In-bounds 4-neighbours of `pos`
    pub fn neighbors(&self, pos: Pos) -> ArrayVec<Pos, 4> {
        let mut out = ArrayVec::new();
        if pos.row > 0 {
            out.push(Pos::new(pos.col, pos.row - 1));
        }
        if pos.col > 0 {
            out.push(Pos::new(pos.col - 1, pos.row));
        }
        for next in [Pos::new(pos.col + 1, pos.row), Pos::new(pos.col, pos.row + 1)] {
            if self.in_bounds(next) {
                out.push(next);
            }
        }
        out
    }

    /// All tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.slots.iter().flatten()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn empty_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.tiles().filter(|tile| tile.kind == kind).count()
    }

    /// Fill every empty slot from `source`
    ///
    /// With `stabilize`, no filled cell completes a run with the two cells to its left
    /// or above. A cell whose drawn kind would do so takes the next free kind, and
    /// when every kind is ruled out (two kinds only) earlier choices are revisited.
    pub fn fill(&mut self, source: &mut TileSource, stabilize: bool) {
        let empties: Vec<Pos> = (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| Pos::new(col, row)))
            .filter(|&pos| self.get(pos) == Some(None))
            .collect();
        let mut draws: Vec<TileDraw> = empties.iter().map(|_| source.draw_plain()).collect();
        if stabilize {
            self.plan_kinds(&empties, &mut draws, source.kind_count());
        }
        for (pos, draw) in empties.into_iter().zip(draws) {
            // In bounds by construction.
            let _ = self.spawn(pos, draw);
        }
    }

    /// Rewrite the kinds of `draws` so that no planned cell completes a run
    ///
    /// Depth-first over the cells in row-major order. Gives up after a bounded number
    /// of steps and keeps whatever kinds were drawn for the cells not yet settled.
    fn plan_kinds(&self, cells: &[Pos], draws: &mut [TileDraw], kind_count: u8) {
        let kind_count = kind_count.max(1);
        let mut planned: Vec<Option<TileKind>> = vec![None; self.slots.len()];
        let start: Vec<u8> = draws.iter().map(|d| d.kind.index()).collect();
        let mut tried = vec![0u8; cells.len()];
        let mut budget = cells.len().saturating_mul(64).max(1024);
        let mut i = 0;

        while i < cells.len() {
            let Some(idx) = self.index(cells[i]) else {
                i += 1;
                continue;
            };
            planned[idx] = None;
            let mut placed = false;
            while tried[i] < kind_count {
                let kind = TileKind::new((start[i] + tried[i]) % kind_count);
                tried[i] += 1;
                if !self.completes_planned_run(cells[i], kind, &planned) {
                    planned[idx] = Some(kind);
                    draws[i].kind = kind;
                    placed = true;
                    break;
                }
            }
            budget = budget.saturating_sub(1);
            if placed {
                i += 1;
            } else if i == 0 || budget == 0 {
                debug!(cell = i, "no run-free kind plan found");
                return;
            } else {
                tried[i] = 0;
                i -= 1;
            }
        }
    }

    /// Would `kind` at `pos` finish a run with the two cells to the left or above?
    ///
    /// Empty slots count with the kind planned for them, if any.
    fn completes_planned_run(&self, pos: Pos, kind: TileKind, planned: &[Option<TileKind>]) -> bool {
        let same = |p: Pos| {
            let Some(idx) = self.index(p) else {
                return false;
            };
            match &self.slots[idx] {
                Some(tile) => !tile.is_special() && tile.kind == kind,
                None => planned[idx] == Some(kind),
            }
        };
        let left = pos.col >= 2
            && same(Pos::new(pos.col - 1, pos.row))
            && same(Pos::new(pos.col - 2, pos.row));
        let up = pos.row >= 2
            && same(Pos::new(pos.col, pos.row - 1))
            && same(Pos::new(pos.col, pos.row - 2));
        left || up
    }

    /// Compact every column downwards, keeping the relative order of its tiles
    ///
    /// Returns one entry per moved tile. Emptied slots end up at the top of each column.
    pub fn apply_gravity(&mut self) -> Vec<Fall> {
        let mut falls = Vec::new();
        for col in 0..self.cols {
            let mut write_row = self.rows;
            for read_row in (0..self.rows).rev() {
                let from = Pos::new(col, read_row);
                let Some(tile) = self.take(from) else {
                    continue;
                };
                write_row -= 1;
                let to = Pos::new(col, write_row);
                let moved = Tile { pos: to, ..tile };
                if let Some(idx) = self.index(to) {
                    self.slots[idx] = Some(moved);
                }
                if write_row != read_row {
                    falls.push(Fall {
                        tile: moved,
                        from_row: read_row,
                        to_row: write_row,
                    });
                }
            }
        }
        falls
    }

    /// Empty slots, column by column, top to bottom
    pub fn empty_positions(&self) -> Vec<Pos> {
        let mut out = Vec::new();
        for col in 0..self.cols {
            for row in 0..self.rows {
                let pos = Pos::new(col, row);
                if self.get(pos) == Some(None) {
                    out.push(pos);
                }
            }
        }
        out
    }

    /// Permute tiles across occupied slots
    pub fn shuffle(&mut self, rng: &mut SimpleRng) {
        let occupied: Vec<Pos> = self.tiles().map(|tile| tile.pos).collect();
        let mut tiles: Vec<Tile> = occupied.iter().filter_map(|&pos| self.take(pos)).collect();
        rng.shuffle(&mut tiles);
        for (pos, tile) in occupied.into_iter().zip(tiles) {
            let _ = self.set(pos, Some(tile));
        }
    }

    /// Kind letters per row (lower-case for area-clear tiles, `.` for empty)
    pub fn layout(&self) -> Vec<String> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| match self.tile(Pos::new(col, row)) {
                        Some(tile) if tile.is_special() => tile.kind.as_char().to_ascii_lowercase(),
                        Some(tile) => tile.kind.as_char(),
                        None => '.',
                    })
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.layout() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
