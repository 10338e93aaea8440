//! Cascade and area-clear resolution tests

use tile_match::core::{
    detonate, scan, GameConfig, Grid, Resolver, Score, TileSource,
};
use tile_match::types::{ClearCause, GameEvent, Pos, TileKind};

fn random_grid(seed: u32, kinds: u8) -> Grid {
    let mut source = TileSource::new(seed, kinds, 0);
    let mut grid = Grid::new(8, 8);
    grid.fill(&mut source, false);
    grid
}

#[test]
fn test_resolve_leaves_no_runs() {
    let config = GameConfig::default();
    for seed in 0..40 {
        let mut grid = random_grid(seed, 4);
        let initial = scan(&grid);
        if initial.is_empty() {
            continue;
        }
        let mut source = TileSource::new(seed.wrapping_mul(31), 4, 0);
        let mut score = Score::default();
        let mut events = Vec::new();

        let report =
            Resolver::new(&mut grid, &mut source, &mut score, &mut events, &config).resolve(initial);

        assert!(!report.capped);
        assert!(scan(&grid).is_empty(), "seed {}\n{}", seed, grid);
        assert!(grid.is_full());
        assert_eq!(report.cleared, report.spawned);
    }
}

#[test]
fn test_score_rises_by_tiles_per_round() {
    let config = GameConfig::default();
    for seed in 0..20 {
        let mut grid = random_grid(seed, 3);
        let initial = scan(&grid);
        let mut source = TileSource::new(seed, 3, 0);
        let mut score = Score::default();
        let mut events = Vec::new();

        Resolver::new(&mut grid, &mut source, &mut score, &mut events, &config).resolve(initial);

        let mut total = 0;
        let mut tiles = 0;
        for event in &events {
            match *event {
                GameEvent::Cleared { .. } => tiles += 1,
                GameEvent::ScoreChanged { score, delta } => {
                    assert_eq!(delta, tiles * 10);
                    assert_eq!(score, total + delta);
                    total = score;
                    tiles = 0;
                }
                _ => {}
            }
        }
        assert_eq!(score.value(), total);
    }
}

#[test]
fn test_single_row_gets_three_fresh_tiles() {
    let mut grid = Grid::parse(&["AAA"]).unwrap();
    let old: Vec<_> = grid.tiles().map(|t| t.id).collect();
    let mut source = TileSource::new(4, 5, 0);
    let mut score = Score::default();
    let mut events = Vec::new();
    let initial = scan(&grid);

    Resolver::new(&mut grid, &mut source, &mut score, &mut events, &GameConfig::default())
        .resolve(initial);

    assert_eq!(grid.tiles().count(), 3);
    assert!(grid.tiles().all(|t| !old.contains(&t.id)));
    assert!(score.value() >= 30);
}

#[test]
fn test_area_clear_removes_exactly_target_kind() {
    for target in 0..4u8 {
        let mut grid = random_grid(100 + u32::from(target), 4);
        // Turn (3, 3) into an area-clear tile by re-parsing the layout
        let mut layout = grid.layout();
        let mut row: Vec<char> = layout[3].chars().collect();
        row[3] = row[3].to_ascii_lowercase();
        layout[3] = row.into_iter().collect();
        let rows: Vec<&str> = layout.iter().map(String::as_str).collect();
        grid = Grid::parse(&rows).unwrap();

        let bomb = *grid.tile(Pos::new(3, 3)).unwrap();
        let kind = TileKind::new(target);
        let expected = grid
            .tiles()
            .filter(|t| t.kind == kind || t.id == bomb.id)
            .count();

        let mut source = TileSource::new(1, 4, 0);
        let mut score = Score::default();
        let mut events = Vec::new();
        let config = GameConfig::default();
        let resolver = Resolver::new(&mut grid, &mut source, &mut score, &mut events, &config);
        detonate(resolver, bomb.pos, kind).unwrap();

        let blasted: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Cleared {
                    tile,
                    cause: ClearCause::AreaClear,
                } => Some(*tile),
                _ => None,
            })
            .collect();
        assert_eq!(blasted.len(), expected);
        assert!(blasted.iter().all(|t| t.kind == kind || t.id == bomb.id));
        assert!(events.contains(&GameEvent::ScoreChanged {
            score: expected as u32 * 20,
            delta: expected as u32 * 20,
        }));
        assert!(grid.is_full());
    }
}
