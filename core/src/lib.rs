#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Sum Ten engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point and its phase-by-phase `step`, and then broadcasts
//! [`Event`] values for systems and presentation layers to react to. Systems
//! consume event slices, query immutable [`Board`] snapshots, and respond with
//! new events of their own.

pub mod board;
pub mod config;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use board::{Board, Cell, SpawnedTile, TileFall};
pub use config::{
    ConfigError, DifficultyConfig, DifficultyTable, GameConfig, MultiplierConfig, SpawnWeights,
};

/// Value carried by an occupied tile.
pub type TileValue = u8;

/// Line sum every solve must hit.
pub const TARGET_SUM: u32 = 10;

/// Location of a single board cell expressed as column and row coordinates.
///
/// Row zero is the top of the board; gravity pulls tiles toward larger rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new board cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether `other` shares an edge with this cell.
    ///
    /// Diagonal neighbours and the cell itself are not adjacent.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Returns the neighbouring cell in `direction`, or `None` when the step
    /// would leave the non-negative quadrant.
    ///
    /// Upper bounds are the board's concern and are not checked here.
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::South => self
                .row
                .checked_add(1)
                .map(|row| Self::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Cardinal directions used for swaps and hints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Order in which hint probing visits neighbours: right, down, left, up.
    pub const HINT_ORDER: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];

    /// Direction leading from `from` to an adjacent `to`, if they are adjacent.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Direction> {
        Self::HINT_ORDER
            .into_iter()
            .find(|direction| from.neighbor(*direction) == Some(to))
    }
}

/// Orientation of a board line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    /// A full horizontal line.
    Row,
    /// A full vertical line.
    Column,
}

/// Outcome of a single detector scan: one line whose values hit the target.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchResult {
    /// Orientation of the matched line.
    pub kind: LineKind,
    /// Row index for rows, column index for columns.
    pub index: u32,
    /// Cells composing the line, ordered left-to-right or top-to-bottom.
    pub cells: Vec<CellCoord>,
}

impl MatchResult {
    /// Reports whether the matched line passes through `cell`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }
}

/// Suggested swap of the tile at `origin` with its neighbour in `direction`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HintMove {
    /// Cell holding the tile to move.
    pub origin: CellCoord,
    /// Direction of the neighbour to swap with.
    pub direction: Direction,
}

impl HintMove {
    /// Cell on the other side of the suggested swap.
    #[must_use]
    pub fn target(&self) -> Option<CellCoord> {
        self.origin.neighbor(self.direction)
    }
}

/// Difficulty tier chosen before a session starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Small values, 5×5 board.
    Easy,
    /// Full value range, 5×5 board.
    #[default]
    Normal,
    /// Full value range, 6×6 board.
    Hard,
}

impl Difficulty {
    /// Lowercase name used in configuration files and on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(UnknownDifficulty(value.to_owned())),
        }
    }
}

/// Error returned when parsing an unrecognised difficulty name.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown difficulty `{0}` (expected easy, normal or hard)")]
pub struct UnknownDifficulty(pub String);

/// Reason a cascade is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CascadeCause {
    /// Initial fill of a new session or a restored layout.
    Setup,
    /// Player swap; the only cause whose solves are scored.
    Swap,
    /// Full-board reset after the grid became unsolvable.
    Regeneration,
}

impl CascadeCause {
    /// Reports whether solves produced under this cause award points.
    #[must_use]
    pub const fn is_scored(&self) -> bool {
        matches!(self, CascadeCause::Swap)
    }
}

/// Reasons a command may be rejected without touching any state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum Rejection {
    /// A cascade is in flight; only an idle world accepts input.
    #[error("a cascade is still resolving")]
    CascadeInFlight,
    /// Both swap coordinates name the same cell.
    #[error("cannot swap a cell with itself")]
    SameCell,
    /// A coordinate lies outside the board.
    #[error("coordinate is outside the board")]
    OutOfBounds,
    /// The cells do not share an edge.
    #[error("cells are not orthogonally adjacent")]
    NotAdjacent,
    /// One of the cells holds no tile.
    #[error("cannot swap an empty cell")]
    EmptyCell,
    /// Regeneration was requested while the grid is not parked as unsolvable.
    #[error("board is not awaiting regeneration")]
    NotAwaitingRegeneration,
    /// A restored layout does not fit the difficulty's dimensions or values.
    #[error("layout does not match the difficulty tier")]
    InvalidLayout,
    /// The session has not started or has already ended.
    #[error("session is not running")]
    SessionNotRunning,
}

/// Graceful error states the cascade resolver can stop in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum CascadeFault {
    /// The line scanner reported a line that is out of bounds, has empty
    /// cells, or does not sum to the target.
    #[error("line scanner reported an invalid line")]
    ScannerReportedInvalidLine,
    /// The line scanner found no first match while matches remain.
    #[error("line scanner missed a pending match")]
    ScannerMissedMatch,
}

/// Live scoring state owned by the streak scorer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreState {
    /// Accumulated score; never decreases within a session.
    pub score: u32,
    /// Consecutive solves since the streak was last reset.
    pub solve_streak: u32,
    /// Current multiplier; at least `1.0`.
    pub multiplier: f32,
    /// Seconds left in the multiplier window; never negative.
    pub multiplier_timer: f32,
    /// Whether the multiplier window is open.
    pub multiplier_active: bool,
    /// Seconds of clock time since the last scored solve.
    pub idle_since_last_solve: f32,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self {
            score: 0,
            solve_streak: 0,
            multiplier: 1.0,
            multiplier_timer: 0.0,
            multiplier_active: false,
            idle_since_last_solve: 0.0,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Discards the current board and fills a fresh one for `difficulty`.
    StartNewSession {
        /// Tier that selects grid size, value range and spawn weights.
        difficulty: Difficulty,
    },
    /// Requests that two orthogonally adjacent tiles trade places.
    RequestSwap {
        /// First cell of the swap.
        a: CellCoord,
        /// Second cell of the swap.
        b: CellCoord,
    },
    /// Replaces an unsolvable board once its settle delay has elapsed.
    RegenerateBoard,
}

/// Discriminant of [`Event`], used to filter subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// See [`Event::SessionStarted`].
    SessionStarted,
    /// See [`Event::TileSwapped`].
    TileSwapped,
    /// See [`Event::SwapRejected`].
    SwapRejected,
    /// See [`Event::CommandRejected`].
    CommandRejected,
    /// See [`Event::CascadeStarted`].
    CascadeStarted,
    /// See [`Event::LineCleared`].
    LineCleared,
    /// See [`Event::LineSolved`].
    LineSolved,
    /// See [`Event::TilesFell`].
    TilesFell,
    /// See [`Event::TilesSpawned`].
    TilesSpawned,
    /// See [`Event::CascadeEnded`].
    CascadeEnded,
    /// See [`Event::GridUnsolvable`].
    GridUnsolvable,
    /// See [`Event::BoardRegenerated`].
    BoardRegenerated,
    /// See [`Event::CascadeFaulted`].
    CascadeFaulted,
    /// See [`Event::SolveScored`].
    SolveScored,
    /// See [`Event::MultiplierChanged`].
    MultiplierChanged,
    /// See [`Event::SessionTimeChanged`].
    SessionTimeChanged,
    /// See [`Event::GameWon`].
    GameWon,
    /// See [`Event::GameLost`].
    GameLost,
}

/// Events broadcast by the world and systems after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A new board was laid out for a session.
    SessionStarted {
        /// Tier the session runs at.
        difficulty: Difficulty,
        /// Number of columns on the board.
        columns: u32,
        /// Number of rows on the board.
        rows: u32,
    },
    /// Two tiles traded places.
    TileSwapped {
        /// First cell of the swap.
        a: CellCoord,
        /// Second cell of the swap.
        b: CellCoord,
    },
    /// A swap request was refused; the board is unchanged.
    SwapRejected {
        /// First cell of the request.
        a: CellCoord,
        /// Second cell of the request.
        b: CellCoord,
        /// Why the swap was refused.
        reason: Rejection,
    },
    /// A non-swap command was refused.
    CommandRejected {
        /// Why the command was refused.
        reason: Rejection,
    },
    /// The resolver left idle and began detecting matches.
    CascadeStarted {
        /// What triggered the cascade.
        cause: CascadeCause,
    },
    /// A line was removed from the board.
    LineCleared {
        /// The cleared line and its coordinates.
        line: MatchResult,
    },
    /// One solve inside a cascade; drives the streak scorer.
    LineSolved {
        /// What triggered the enclosing cascade.
        cause: CascadeCause,
        /// One-based position of this solve within its cascade.
        chain: u32,
    },
    /// Gravity compacted columns.
    TilesFell {
        /// Every tile that moved, in column order.
        falls: Vec<TileFall>,
    },
    /// Fresh tiles were spawned into empty cells.
    TilesSpawned {
        /// Spawned tiles in fill order.
        tiles: Vec<SpawnedTile>,
    },
    /// The resolver returned to idle.
    CascadeEnded {
        /// What triggered the cascade.
        cause: CascadeCause,
        /// Number of solves the cascade produced.
        solves: u32,
    },
    /// The settled board admits no target-sum line and will be replaced.
    GridUnsolvable,
    /// Every tile was replaced after the grid became unsolvable.
    BoardRegenerated,
    /// The resolver stopped in an error state.
    CascadeFaulted {
        /// What went wrong.
        fault: CascadeFault,
    },
    /// Points were awarded for a solve.
    SolveScored {
        /// Score after the award.
        total: u32,
        /// Points awarded.
        delta: u32,
    },
    /// The multiplier window changed.
    MultiplierChanged {
        /// Whether the window is open.
        active: bool,
        /// Current multiplier.
        multiplier: f32,
        /// Seconds remaining in the window.
        timer: f32,
    },
    /// The session clock advanced.
    SessionTimeChanged {
        /// Seconds left in the session.
        remaining: f32,
    },
    /// The session ended with the win threshold reached.
    GameWon {
        /// Final score.
        score: u32,
    },
    /// The session clock ran out below the win threshold.
    GameLost {
        /// Final score.
        score: u32,
    },
}

impl Event {
    /// Discriminant used for subscription filtering.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Event::SessionStarted { .. } => EventKind::SessionStarted,
            Event::TileSwapped { .. } => EventKind::TileSwapped,
            Event::SwapRejected { .. } => EventKind::SwapRejected,
            Event::CommandRejected { .. } => EventKind::CommandRejected,
            Event::CascadeStarted { .. } => EventKind::CascadeStarted,
            Event::LineCleared { .. } => EventKind::LineCleared,
            Event::LineSolved { .. } => EventKind::LineSolved,
            Event::TilesFell { .. } => EventKind::TilesFell,
            Event::TilesSpawned { .. } => EventKind::TilesSpawned,
            Event::CascadeEnded { .. } => EventKind::CascadeEnded,
            Event::GridUnsolvable => EventKind::GridUnsolvable,
            Event::BoardRegenerated => EventKind::BoardRegenerated,
            Event::CascadeFaulted { .. } => EventKind::CascadeFaulted,
            Event::SolveScored { .. } => EventKind::SolveScored,
            Event::MultiplierChanged { .. } => EventKind::MultiplierChanged,
            Event::SessionTimeChanged { .. } => EventKind::SessionTimeChanged,
            Event::GameWon { .. } => EventKind::GameWon,
            Event::GameLost { .. } => EventKind::GameLost,
        }
    }
}

/// Detects target-sum lines on a board.
///
/// The cascade resolver holds one of these and re-scans after every clear, so
/// implementations must report at most one line per call with rows before
/// columns and the lowest index first.
pub trait LineScanner: fmt::Debug {
    /// Returns the first matching line in scan order, if any.
    fn scan_for_first_match(&self, board: &Board) -> Option<MatchResult>;

    /// Returns every matching row and column, in no particular priority.
    fn all_matches(&self, board: &Board) -> Vec<MatchResult>;
}

/// Decides whether a settled board can still produce a solve.
pub trait ViabilityProbe: fmt::Debug {
    /// Reports whether the board's tiles admit a target-sum line.
    fn has_valid_moves(&self, board: &Board) -> bool;
}
