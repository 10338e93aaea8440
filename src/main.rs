//! Tile Match runner (default binary).
//!
//! Serves the line-delimited JSON protocol on stdin/stdout, or plays headlessly with
//! `--autoplay N` and prints a JSON summary. Logs go to stderr (`RUST_LOG`).

use std::io;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tile_match::adapter::Runtime;
use tile_match::autoplay::autoplay;
use tile_match::core::{AnimationTiming, GameConfig, GameSession, NullSink};
use tile_match::types::{
    BombTrigger, SessionMode, AREA_CLEAR_MULTIPLIER, DEFAULT_COLS, DEFAULT_KIND_COUNT,
    DEFAULT_MAX_CASCADE_ROUNDS, DEFAULT_ROWS, POINTS_PER_TILE,
};

/// Tile Match - grid tile-matching engine
#[derive(Parser, Debug)]
#[command(name = "tile-match")]
#[command(about = "Deterministic tile-matching puzzle engine", long_about = None)]
#[command(version)]
struct Args {
    /// Grid width
    #[arg(long, default_value_t = DEFAULT_COLS)]
    cols: u16,

    /// Grid height
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: u16,

    /// Number of distinct tile kinds
    #[arg(short, long, default_value_t = DEFAULT_KIND_COUNT)]
    kinds: u8,

    /// RNG seed
    #[arg(short, long, default_value_t = 1)]
    seed: u32,

    /// Points per cleared tile
    #[arg(long, default_value_t = POINTS_PER_TILE)]
    points: u32,

    /// Score multiplier for area-clear destruction
    #[arg(long, default_value_t = AREA_CLEAR_MULTIPLIER)]
    multiplier: u32,

    /// End the session after this many seconds of ticks
    #[arg(long)]
    timed: Option<u32>,

    /// How area-clear tiles fire: tap or swap
    #[arg(long, default_value = "tap")]
    bomb_trigger: String,

    /// Chance per mille that a refilled tile is an area-clear tile
    #[arg(long, default_value_t = 0)]
    bomb_chance: u16,

    /// Lock input for the standard animation lengths
    #[arg(long)]
    animate: bool,

    /// Cascade round limit per resolution
    #[arg(long, default_value_t = DEFAULT_MAX_CASCADE_ROUNDS)]
    max_rounds: u32,

    /// Do not shuffle boards that run out of moves
    #[arg(long)]
    no_reshuffle: bool,

    /// Play this many hinted moves headlessly and print a summary
    #[arg(long, value_name = "N")]
    autoplay: Option<u32>,
}

impl Args {
    fn config(&self) -> Result<GameConfig> {
        let Some(bomb_trigger) = BombTrigger::from_str(&self.bomb_trigger) else {
            bail!("unknown bomb trigger {:?} (expected tap or swap)", self.bomb_trigger);
        };
        let mode = match self.timed {
            Some(secs) => SessionMode::Timed {
                duration_ms: secs.saturating_mul(1000),
            },
            None => SessionMode::Unlimited,
        };
        Ok(GameConfig {
            cols: self.cols,
            rows: self.rows,
            kind_count: self.kinds,
            points_per_tile: self.points,
            area_clear_multiplier: self.multiplier,
            mode,
            bomb_trigger,
            bomb_spawn_per_mille: self.bomb_chance,
            timing: if self.animate {
                AnimationTiming::STANDARD
            } else {
                AnimationTiming::INSTANT
            },
            max_cascade_rounds: self.max_rounds,
            reshuffle_when_stuck: !self.no_reshuffle,
            ..GameConfig::default()
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config()?;
    let mut session =
        GameSession::new(config, args.seed).context("invalid game configuration")?;
    info!(seed = args.seed, cols = args.cols, rows = args.rows, "session created");

    match args.autoplay {
        Some(moves) => run_autoplay(&mut session, moves),
        None => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut runtime = Runtime::new(session);
            runtime.run(stdin.lock(), stdout.lock())?;
            Ok(())
        }
    }
}

fn run_autoplay(session: &mut GameSession, moves: u32) -> Result<()> {
    let summary = autoplay(session, moves, &mut NullSink).context("autoplay failed")?;
    let report = serde_json::json!({
        "seed": session.seed(),
        "moves": session.moves(),
        "attempted": summary.attempted,
        "reverted": summary.reverted,
        "score": summary.score,
        "cleared": summary.tally.cleared,
        "detonations": summary.tally.detonations,
        "reshuffles": summary.tally.reshuffles,
        "longest_cascade": summary.tally.longest_cascade,
        "stuck": summary.stuck,
        "game_over": session.game_over(),
        "board": session.grid().layout(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
