//! Selection controller - the two-pick swap protocol
//!
//! ```text
//! Idle --pick--> OneSelected(T) --pick adjacent--> Resolving --lock drained--> Idle
//!                     |  ^
//!                     +--+ pick non-adjacent (reselect)
//! ```
//!
//! [`decide`] is pure: it looks at the current selection and the picked tile and says
//! what the session has to do. The session performs the step and moves the selection on.

use crate::grid::{Adjacent, Grid};
use crate::types::{BombTrigger, Tile, TileKind};

/// Where the pick protocol currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    OneSelected(Tile),
    /// A swap, revert or cascade is playing out; picks are ignored
    Resolving,
}

impl Selection {
    pub fn selected(&self) -> Option<Tile> {
        match self {
            Selection::OneSelected(tile) => Some(*tile),
            _ => None,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Selection::Resolving)
    }
}

/// What a pick asks the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickStep {
    /// Input is locked
    Ignored,
    /// First pick: select and highlight
    Highlight(Tile),
    /// Same tile picked again
    Unchanged,
    /// Non-adjacent second pick: move the highlight
    Reselect { from: Tile, to: Tile },
    /// Adjacent second pick: try the swap
    Swap { first: Tile, second: Tile, pair: Adjacent },
    /// Trigger an area-clear tile
    Detonate {
        bomb: Tile,
        target: TileKind,
        /// Selection to drop before detonating
        previous: Option<Tile>,
        /// Swap to perform first (swap-triggered bombs)
        swap: Option<Adjacent>,
    },
}

/// Decide the step for picking `picked` in state `selection`
pub fn decide(selection: &Selection, grid: &Grid, picked: Tile, trigger: BombTrigger) -> PickStep {
    let first = match *selection {
        Selection::Resolving => return PickStep::Ignored,
        Selection::Idle => {
            if trigger == BombTrigger::Tap && picked.is_special() {
                return PickStep::Detonate {
                    bomb: picked,
                    target: picked.kind,
                    previous: None,
                    swap: None,
                };
            }
            return PickStep::Highlight(picked);
        }
        Selection::OneSelected(first) => first,
    };

    if trigger == BombTrigger::Tap && picked.is_special() && picked.id != first.id {
        return PickStep::Detonate {
            bomb: picked,
            target: first.kind,
            previous: Some(first),
            swap: None,
        };
    }
    if picked.id == first.id {
        return PickStep::Unchanged;
    }

    let Ok(pair) = grid.adjacent(first.pos, picked.pos) else {
        return PickStep::Reselect {
            from: first,
            to: picked,
        };
    };

    if trigger == BombTrigger::Swap && (first.is_special() || picked.is_special()) {
        let (bomb, other) = if first.is_special() {
            (first, picked)
        } else {
            (picked, first)
        };
        return PickStep::Detonate {
            bomb,
            target: other.kind,
            previous: Some(first),
            swap: Some(pair),
        };
    }

    PickStep::Swap {
        first,
        second: picked,
        pair,
    }
}
