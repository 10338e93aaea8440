//! Plain copy of the session state for observers.

use crate::types::{Phase, Pos};

/// One occupied or empty cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSnapshot {
    /// Kind index, `None` for an empty slot
    pub kind: Option<u8>,
    pub special: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub cols: u16,
    pub rows: u16,
    /// Row-major cells
    pub cells: Vec<CellSnapshot>,
    pub selected: Option<Pos>,
    pub phase: Phase,
    pub locked: bool,
    pub score: u32,
    /// `None` in unlimited mode
    pub remaining_ms: Option<u32>,
    pub moves: u32,
    pub game_over: bool,
    pub episode_id: u32,
    pub seed: u32,
}

impl GameSnapshot {
    pub fn cell(&self, pos: Pos) -> Option<CellSnapshot> {
        if pos.col >= self.cols || pos.row >= self.rows {
            return None;
        }
        self.cells
            .get(usize::from(pos.row) * usize::from(self.cols) + usize::from(pos.col))
            .copied()
    }

    /// Kind letters per row, same format as `Grid::layout`
    pub fn layout(&self) -> Vec<String> {
        self.cells
            .chunks(usize::from(self.cols.max(1)))
            .map(|row| {
                row.iter()
                    .map(|cell| match cell.kind {
                        None => '.',
                        Some(kind) => {
                            let c = crate::types::TileKind::new(kind).as_char();
                            if cell.special {
                                c.to_ascii_lowercase()
                            } else {
                                c
                            }
                        }
                    })
                    .collect()
            })
            .collect()
    }

    pub fn playable(&self) -> bool {
        !self.game_over && !self.locked
    }
}
