#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Sum Ten engine.
//!
//! The world exclusively owns the board. Adapters and systems change it only
//! by submitting [`Command`] values through [`apply`]; cascades then advance
//! one phase per [`step`] call so a host loop can present intermediate states
//! between phases.

mod cascade;
mod spawn;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sum_ten_core::{
    Board, CascadeCause, CellCoord, Command, Difficulty, Event, GameConfig, LineScanner,
    Rejection, ViabilityProbe,
};
use tracing::{debug, info};

pub use cascade::{CascadePhase, CascadeStatus};
pub use spawn::TileSpawner;

use cascade::Cascade;

/// Collaborators the cascade resolver consults while resolving.
#[derive(Debug)]
pub struct CascadeSystems {
    /// Detects target-sum lines after every refill.
    pub scanner: Box<dyn LineScanner>,
    /// Decides whether a settled board can still be solved.
    pub probe: Box<dyn ViabilityProbe>,
}

/// Represents the authoritative Sum Ten world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    difficulty: Difficulty,
    board: Board,
    spawner: TileSpawner,
    rng: ChaCha8Rng,
    systems: CascadeSystems,
    cascade: Cascade,
    session_started: bool,
}

impl World {
    /// Creates an empty world. No session runs until one is started.
    ///
    /// `config` is expected to have passed [`GameConfig::validate`]. Equal
    /// seeds and equal command sequences produce identical boards.
    #[must_use]
    pub fn new(config: GameConfig, seed: u64, systems: CascadeSystems) -> Self {
        let difficulty = Difficulty::default();
        let tier = config.difficulty(difficulty);
        let board = Board::new(tier.grid_size, tier.grid_size);
        let spawner = TileSpawner::new(tier.spawn_weights.clone(), config.fallback_spawn_value);
        Self {
            config,
            difficulty,
            board,
            spawner,
            rng: ChaCha8Rng::seed_from_u64(seed),
            systems,
            cascade: Cascade::new(),
            session_started: false,
        }
    }

    /// Discards the board and fills a fresh one for `difficulty`.
    ///
    /// Matches present in the initial fill are resolved as a
    /// [`CascadeCause::Setup`] cascade.
    pub fn start_session(
        &mut self,
        difficulty: Difficulty,
        out_events: &mut Vec<Event>,
    ) -> Result<(), Rejection> {
        self.ensure_resettable()?;
        self.install(difficulty, None, out_events);
        let tiles = self.spawner.fill(&mut self.board, &mut self.rng);
        out_events.push(Event::TilesSpawned { tiles });
        self.cascade.begin(CascadeCause::Setup, out_events);
        Ok(())
    }

    /// Starts a session from a preset layout instead of a random fill.
    ///
    /// The layout must be fully occupied, match the tier's board size and stay
    /// within its value range.
    pub fn restore(
        &mut self,
        difficulty: Difficulty,
        board: Board,
        out_events: &mut Vec<Event>,
    ) -> Result<(), Rejection> {
        self.ensure_resettable()?;
        let tier = self.config.difficulty(difficulty);
        let fits = board.width() == tier.grid_size
            && board.height() == tier.grid_size
            && board.is_full()
            && board
                .occupied_values()
                .iter()
                .all(|value| *value <= tier.max_value);
        if !fits {
            return Err(Rejection::InvalidLayout);
        }

        self.install(difficulty, Some(board), out_events);
        self.cascade.begin(CascadeCause::Setup, out_events);
        Ok(())
    }

    /// Swaps two orthogonally adjacent tiles and starts a scored cascade.
    ///
    /// Rejected requests leave the board untouched.
    pub fn request_swap(
        &mut self,
        a: CellCoord,
        b: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), Rejection> {
        if !self.session_started {
            return Err(Rejection::SessionNotRunning);
        }
        if !self.cascade.status().is_idle() {
            return Err(Rejection::CascadeInFlight);
        }
        if a == b {
            return Err(Rejection::SameCell);
        }
        if !self.board.contains(a) || !self.board.contains(b) {
            return Err(Rejection::OutOfBounds);
        }
        if !a.is_adjacent(b) {
            return Err(Rejection::NotAdjacent);
        }
        if self.board.value(a).is_none() || self.board.value(b).is_none() {
            return Err(Rejection::EmptyCell);
        }

        let _ = self.board.swap(a, b);
        out_events.push(Event::TileSwapped { a, b });
        self.cascade.begin(CascadeCause::Swap, out_events);
        Ok(())
    }

    /// Replaces every tile of a board parked as unsolvable.
    pub fn regenerate(&mut self, out_events: &mut Vec<Event>) -> Result<(), Rejection> {
        if self.cascade.status() != CascadeStatus::AwaitingRegeneration {
            return Err(Rejection::NotAwaitingRegeneration);
        }

        info!(difficulty = self.difficulty.as_str(), "regenerating board");
        self.board.clear();
        let tiles = self.spawner.fill(&mut self.board, &mut self.rng);
        out_events.push(Event::BoardRegenerated);
        out_events.push(Event::TilesSpawned { tiles });
        self.cascade.begin(CascadeCause::Regeneration, out_events);
        Ok(())
    }

    fn ensure_resettable(&self) -> Result<(), Rejection> {
        if self.cascade.status().accepts_reset() {
            Ok(())
        } else {
            Err(Rejection::CascadeInFlight)
        }
    }

    fn install(
        &mut self,
        difficulty: Difficulty,
        board: Option<Board>,
        out_events: &mut Vec<Event>,
    ) {
        let tier = self.config.difficulty(difficulty);
        let size = tier.grid_size;
        self.spawner = TileSpawner::new(
            tier.spawn_weights.clone(),
            self.config.fallback_spawn_value,
        );
        self.board = board.unwrap_or_else(|| Board::new(size, size));
        self.difficulty = difficulty;
        self.session_started = true;

        info!(difficulty = difficulty.as_str(), size, "session started");
        out_events.push(Event::SessionStarted {
            difficulty,
            columns: size,
            rows: size,
        });
    }
}

/// Applies the provided command to the world.
///
/// Rejected commands emit [`Event::SwapRejected`] or
/// [`Event::CommandRejected`] and leave every piece of state untouched.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartNewSession { difficulty } => {
            if let Err(reason) = world.start_session(difficulty, out_events) {
                debug!(%reason, "session start rejected");
                out_events.push(Event::CommandRejected { reason });
            }
        }
        Command::RequestSwap { a, b } => {
            if let Err(reason) = world.request_swap(a, b, out_events) {
                debug!(%a, %b, %reason, "swap rejected");
                out_events.push(Event::SwapRejected { a, b, reason });
            }
        }
        Command::RegenerateBoard => {
            if let Err(reason) = world.regenerate(out_events) {
                debug!(%reason, "regeneration rejected");
                out_events.push(Event::CommandRejected { reason });
            }
        }
    }
}

/// Advances an in-flight cascade by exactly one phase.
///
/// Returns `false` when the resolver is idle, parked awaiting regeneration, or
/// faulted, in which case nothing changed.
pub fn step(world: &mut World, out_events: &mut Vec<Event>) -> bool {
    world.cascade.advance(
        &mut world.board,
        &world.systems,
        &world.spawner,
        &mut world.rng,
        out_events,
    )
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use sum_ten_core::{Board, CascadeCause, Difficulty, GameConfig};

    use super::{CascadeStatus, World};

    /// Provides read-only access to the board.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Difficulty tier of the current session.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Current state of the cascade resolver.
    #[must_use]
    pub fn cascade_status(world: &World) -> CascadeStatus {
        world.cascade.status()
    }

    /// Cause of the cascade in flight, if any.
    #[must_use]
    pub fn cascade_cause(world: &World) -> Option<CascadeCause> {
        world.cascade.cause()
    }

    /// Reports whether the board is stable and a session is running.
    #[must_use]
    pub fn is_idle(world: &World) -> bool {
        world.session_started && world.cascade.status().is_idle()
    }

    /// Reports whether a session has been started.
    #[must_use]
    pub fn session_started(world: &World) -> bool {
        world.session_started
    }

    /// Line sum every solve must hit.
    #[must_use]
    pub fn target_sum(world: &World) -> u32 {
        world.config.target_sum
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }
}
