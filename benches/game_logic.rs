use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tile_match::autoplay::autoplay;
use tile_match::core::{
    find_move, scan, GameConfig, GameSession, Grid, NullSink, Resolver, Score, TileSource,
};
use tile_match::types::BombTrigger;

fn bench_scan(c: &mut Criterion) {
    let session = GameSession::new(GameConfig::default(), 12345).unwrap();
    let grid = session.grid().clone();

    c.bench_function("scan_8x8", |b| {
        b.iter(|| {
            black_box(scan(black_box(&grid)));
        })
    });
}

fn bench_find_move(c: &mut Criterion) {
    let session = GameSession::new(GameConfig::default(), 12345).unwrap();
    let grid = session.grid().clone();

    c.bench_function("find_move_8x8", |b| {
        b.iter(|| {
            black_box(find_move(black_box(&grid), BombTrigger::Tap));
        })
    });
}

fn bench_resolve(c: &mut Criterion) {
    let config = GameConfig::default();
    let layout = [
        "AAAABCDE", "BCDEABCD", "CDEABCDE", "DEABCDEA", "EABCDEAB", "ABCDEABC", "BCDEABCD",
        "AAAAAAAA",
    ];
    let start = Grid::parse(&layout).unwrap();

    c.bench_function("resolve_two_rows", |b| {
        b.iter(|| {
            let mut grid = start.clone();
            let mut source = TileSource::new(12345, 5, 0);
            let mut score = Score::default();
            let initial = scan(&grid);
            let report =
                Resolver::new(&mut grid, &mut source, &mut score, &mut NullSink, &config)
                    .resolve(initial);
            black_box(report);
        })
    });
}

fn bench_autoplay(c: &mut Criterion) {
    c.bench_function("autoplay_50_moves", |b| {
        b.iter(|| {
            let mut session = GameSession::new(GameConfig::default(), 12345).unwrap();
            black_box(autoplay(&mut session, 50, &mut NullSink).unwrap());
        })
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut session = GameSession::new(GameConfig::default(), 12345).unwrap();

    c.bench_function("session_tick_16ms", |b| {
        b.iter(|| {
            session.tick(black_box(16), &mut NullSink);
        })
    });
}

criterion_group!(
    benches,
    bench_scan,
    bench_find_move,
    bench_resolve,
    bench_autoplay,
    bench_tick
);
criterion_main!(benches);
