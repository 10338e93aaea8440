//! Area-clear ("colour bomb") effect
//!
//! Triggering an area-clear tile destroys every tile on the board whose kind equals
//! the target kind, wherever it sits, plus the bomb itself. The gaps then cascade
//! exactly like a match round.

use tracing::{debug, instrument};

use crate::cascade::{CascadeReport, Resolver};
use crate::error::GridError;
use crate::events::EventSink;
use crate::grid::Grid;
use crate::matcher::MatchSet;
use crate::types::{ClearCause, GameEvent, Phase, Pos, Tile, TileKind};

/// Tiles destroyed when `bomb` goes off against `target`
pub fn blast_set(grid: &Grid, bomb: &Tile, target: TileKind) -> MatchSet {
    grid.tiles()
        .filter(|tile| tile.kind == target || tile.id == bomb.id)
        .copied()
        .collect()
}

/// Detonate the area-clear tile at `bomb_pos` against `target`
///
/// Fails without touching the grid if the slot is empty or holds a plain tile.
#[instrument(skip(resolver), fields(col = bomb_pos.col, row = bomb_pos.row, target = target.index()))]
pub fn detonate<S: EventSink + ?Sized>(
    mut resolver: Resolver<'_, S>,
    bomb_pos: Pos,
    target: TileKind,
) -> Result<CascadeReport, GridError> {
    let bomb = *resolver
        .grid()
        .tile(bomb_pos)
        .ok_or(GridError::EmptySlot(bomb_pos))?;
    if !bomb.is_special() {
        return Err(GridError::NotSpecial(bomb_pos));
    }

    let blast = blast_set(resolver.grid(), &bomb, target);
    debug!(tiles = blast.len(), "area clear");

    resolver.enter(Phase::Detonating);
    resolver.emit(GameEvent::Detonated { bomb, target });
    resolver.clear(&blast, ClearCause::AreaClear);
    Ok(resolver.settle())
}
