//! Match detection tests

use tile_match::core::{find_move, scan, Grid, Hint, TileSource};
use tile_match::types::{BombTrigger, Pos};

#[test]
fn test_three_in_a_row_scans_to_all_three() {
    let grid = Grid::parse(&["AAA"]).unwrap();
    let found = scan(&grid);
    assert_eq!(found.len(), 3);
    assert_eq!(
        found.positions(),
        [Pos::new(0, 0), Pos::new(1, 0), Pos::new(2, 0)]
    );
}

#[test]
fn test_stabilized_boards_have_no_runs() {
    for seed in 0..50 {
        for kinds in [2, 3, 4, 6] {
            let mut source = TileSource::new(seed, kinds, 0);
            let mut grid = Grid::new(9, 9);
            grid.fill(&mut source, true);
            assert!(scan(&grid).is_empty(), "seed {} kinds {}\n{}", seed, kinds, grid);
        }
    }
}

#[test]
fn test_every_found_tile_sits_in_a_run() {
    for seed in 0..30 {
        let mut source = TileSource::new(seed, 3, 0);
        let mut grid = Grid::new(7, 7);
        grid.fill(&mut source, false);

        for tile in scan(&grid).tiles() {
            let same = |col: i32, row: i32| {
                col >= 0
                    && row >= 0
                    && grid
                        .tile(Pos::new(col as u16, row as u16))
                        .is_some_and(|t| t.kind == tile.kind)
            };
            let (c, r) = (i32::from(tile.pos.col), i32::from(tile.pos.row));
            let in_row = (same(c - 2, r) && same(c - 1, r))
                || (same(c - 1, r) && same(c + 1, r))
                || (same(c + 1, r) && same(c + 2, r));
            let in_col = (same(c, r - 2) && same(c, r - 1))
                || (same(c, r - 1) && same(c, r + 1))
                || (same(c, r + 1) && same(c, r + 2));
            assert!(in_row || in_col, "seed {} tile {:?}", seed, tile.pos);
        }
    }
}

#[test]
fn test_hinted_swap_creates_a_run() {
    for seed in 0..20 {
        let mut source = TileSource::new(seed, 5, 0);
        let mut grid = Grid::new(8, 8);
        grid.fill(&mut source, true);

        if let Some(Hint::Swap(a, b)) = find_move(&grid, BombTrigger::Tap) {
            grid.try_swap(a, b).unwrap();
            let found = scan(&grid);
            let ids: Vec<_> = [a, b]
                .iter()
                .map(|&p| grid.tile(p).unwrap().id)
                .collect();
            assert!(ids.iter().any(|&id| found.contains(id)), "seed {}", seed);
        }
    }
}

#[test]
fn test_area_clear_tiles_always_offer_a_move() {
    let grid = Grid::parse(&["ABC", "BcA", "CAB"]).unwrap();
    assert!(scan(&grid).is_empty());
    assert_eq!(
        find_move(&grid, BombTrigger::Tap),
        Some(Hint::Tap(Pos::new(1, 1)))
    );
    assert!(matches!(
        find_move(&grid, BombTrigger::Swap),
        Some(Hint::Swap(a, _)) if a == Pos::new(1, 1)
    ));
}
