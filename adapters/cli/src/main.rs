#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Sum Ten session.

mod layout_transfer;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sum_ten_core::{Board, CellCoord, Difficulty, Event, GameConfig};
use sum_ten_system_session::{EventFilter, Session};
use sum_ten_world::{query, CascadeStatus};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use layout_transfer::BoardLayout;

const MOVE_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;
const MAX_SETTLE_FRAMES: usize = 100_000;

/// Headless driver for the Sum Ten puzzle engine.
#[derive(Debug, Parser)]
#[command(name = "sum-ten", version, about)]
struct Args {
    /// Difficulty tier: easy, normal or hard.
    #[arg(long, default_value = "normal")]
    difficulty: Difficulty,
    /// Seed for board generation and fallback moves.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// TOML file overriding the default configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Layout string (as printed at exit) to start from instead of a random board.
    #[arg(long)]
    layout: Option<String>,
    /// Maximum number of swaps to attempt.
    #[arg(long, default_value_t = 20)]
    moves: u32,
    /// Simulated frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Stream events as JSON lines instead of debug output.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Sum Ten command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let mut session = Session::new(config, args.seed);
    let json = args.json;
    let _ = session.subscribe(EventFilter::All, move |event| print_event(event, json));

    match args.layout.as_deref() {
        Some(encoded) => {
            let layout = BoardLayout::decode(encoded).context("failed to decode --layout")?;
            session
                .restore(layout.difficulty, layout.board)
                .context("layout does not fit its difficulty tier")?;
        }
        None => session
            .start(args.difficulty)
            .context("failed to start session")?,
    }

    let frame = args.frame_ms as f32 / 1000.0;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed ^ MOVE_SEED_SALT);
    for _ in 0..args.moves {
        settle(&mut session, frame)?;
        // One idle frame of "thinking" per move keeps the clocks running.
        session.update(frame);
        if !session.is_running() {
            break;
        }

        let (a, b) = choose_move(&session, &mut rng);
        if let Err(reason) = session.request_swap(a, b) {
            debug!(%a, %b, %reason, "move refused");
        }
    }
    settle(&mut session, frame)?;

    print_summary(&session);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    GameConfig::from_toml_str(&source)
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

/// Runs frames until the board is stable or the session ends.
fn settle(session: &mut Session, frame: f32) -> Result<()> {
    for _ in 0..MAX_SETTLE_FRAMES {
        if !session.is_running() {
            return Ok(());
        }
        match session.cascade_status() {
            CascadeStatus::Idle => return Ok(()),
            CascadeStatus::Faulted(fault) => bail!("cascade faulted: {fault}"),
            _ => session.update(frame),
        }
    }
    bail!("board did not settle within {MAX_SETTLE_FRAMES} frames")
}

/// Prefers the advisor's hint; otherwise swaps a random adjacent pair.
fn choose_move<R: Rng>(session: &Session, rng: &mut R) -> (CellCoord, CellCoord) {
    if let Some((origin, target)) = session
        .request_hint()
        .and_then(|hint| hint.target().map(|target| (hint.origin, target)))
    {
        return (origin, target);
    }

    let board = query::board(session.world());
    let (width, height) = (board.width(), board.height());
    if rng.gen_bool(0.5) {
        let origin = CellCoord::new(rng.gen_range(0..width - 1), rng.gen_range(0..height));
        (origin, CellCoord::new(origin.column() + 1, origin.row()))
    } else {
        let origin = CellCoord::new(rng.gen_range(0..width), rng.gen_range(0..height - 1));
        (origin, CellCoord::new(origin.column(), origin.row() + 1))
    }
}

fn print_event(event: &Event, json: bool) {
    if !json {
        println!("{event:?}");
        return;
    }
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(error) => warn!(%error, "failed to serialise event"),
    }
}

fn print_summary(session: &Session) {
    let world = session.world();
    let board = query::board(world);
    println!();
    println!("{}", render_board(board));

    let score = session.score();
    println!(
        "status: {:?}  score: {}  streak: {}  multiplier: {:.2}  time left: {:.1}s",
        session.status(),
        score.score,
        score.solve_streak,
        score.multiplier,
        session.remaining()
    );

    let layout = BoardLayout {
        difficulty: query::difficulty(world),
        board: board.clone(),
    };
    match layout.encode() {
        Ok(encoded) => println!("layout: {encoded}"),
        Err(error) => warn!(%error, "board layout not captured"),
    }
}

fn render_board(board: &Board) -> String {
    (0..board.height())
        .map(|row| {
            (0..board.width())
                .map(|column| match board.value(CellCoord::new(column, row)) {
                    Some(value) => value.to_string(),
                    None => ".".to_owned(),
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
