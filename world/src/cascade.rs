//! Phase-by-phase cascade resolution.
//!
//! A cascade runs `Detect → Clear → Drop → Refill` until a detect pass finds
//! nothing, then settles. Every call to [`Cascade::advance`] executes exactly
//! one phase so the host loop can present the intermediate board.

use rand::Rng;
use sum_ten_core::{Board, CascadeCause, CascadeFault, Event, MatchResult, TARGET_SUM};
use tracing::{debug, error, warn};

use crate::{spawn::TileSpawner, CascadeSystems};

/// Phase a resolving cascade will execute on its next step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CascadePhase {
    /// Scan for the first target-sum line.
    Detect,
    /// Remove the detected line.
    Clear,
    /// Compact columns under gravity.
    Drop,
    /// Spawn tiles into emptied cells.
    Refill,
}

/// Observable state of the cascade resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CascadeStatus {
    /// Stable board; swaps are accepted.
    Idle,
    /// Working through detect/clear/drop/refill cycles.
    Resolving(CascadePhase),
    /// No match remains; viability is checked on the next step.
    Settling,
    /// The settled board is unsolvable and waits for `RegenerateBoard`.
    AwaitingRegeneration,
    /// Resolution stopped because a collaborator misbehaved.
    Faulted(CascadeFault),
}

impl CascadeStatus {
    /// Reports whether the board is stable and accepting input.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, CascadeStatus::Idle)
    }

    /// Reports whether the board may be replaced wholesale.
    ///
    /// A faulted resolver is the one non-idle state a new session may leave.
    #[must_use]
    pub const fn accepts_reset(&self) -> bool {
        matches!(self, CascadeStatus::Idle | CascadeStatus::Faulted(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Detect,
    Clear(MatchResult),
    Drop,
    Refill,
    Settling,
    AwaitingRegeneration,
    Faulted(CascadeFault),
}

#[derive(Debug)]
pub(crate) struct Cascade {
    state: State,
    cause: CascadeCause,
    solves: u32,
}

impl Cascade {
    pub(crate) const fn new() -> Self {
        Self {
            state: State::Idle,
            cause: CascadeCause::Setup,
            solves: 0,
        }
    }

    pub(crate) fn status(&self) -> CascadeStatus {
        match &self.state {
            State::Idle => CascadeStatus::Idle,
            State::Detect => CascadeStatus::Resolving(CascadePhase::Detect),
            State::Clear(_) => CascadeStatus::Resolving(CascadePhase::Clear),
            State::Drop => CascadeStatus::Resolving(CascadePhase::Drop),
            State::Refill => CascadeStatus::Resolving(CascadePhase::Refill),
            State::Settling => CascadeStatus::Settling,
            State::AwaitingRegeneration => CascadeStatus::AwaitingRegeneration,
            State::Faulted(fault) => CascadeStatus::Faulted(*fault),
        }
    }

    pub(crate) fn cause(&self) -> Option<CascadeCause> {
        match self.state {
            State::Idle => None,
            _ => Some(self.cause),
        }
    }

    pub(crate) fn begin(&mut self, cause: CascadeCause, out_events: &mut Vec<Event>) {
        debug!(?cause, "cascade started");
        self.state = State::Detect;
        self.cause = cause;
        self.solves = 0;
        out_events.push(Event::CascadeStarted { cause });
    }

    /// Executes one phase. Returns `false` when there was nothing to do.
    pub(crate) fn advance<R: Rng + ?Sized>(
        &mut self,
        board: &mut Board,
        systems: &CascadeSystems,
        spawner: &TileSpawner,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let state = std::mem::replace(&mut self.state, State::Idle);
        self.state = match state {
            State::Detect => self.detect(board, systems, out_events),
            State::Clear(line) => self.clear(board, line, out_events),
            State::Drop => {
                let falls = board.apply_gravity();
                if !falls.is_empty() {
                    out_events.push(Event::TilesFell { falls });
                }
                State::Refill
            }
            State::Refill => {
                let tiles = spawner.fill(board, rng);
                if !tiles.is_empty() {
                    out_events.push(Event::TilesSpawned { tiles });
                }
                State::Detect
            }
            State::Settling => self.settle(board, systems, out_events),
            idle @ (State::Idle | State::AwaitingRegeneration | State::Faulted(_)) => {
                self.state = idle;
                return false;
            }
        };
        true
    }

    fn detect(
        &mut self,
        board: &Board,
        systems: &CascadeSystems,
        out_events: &mut Vec<Event>,
    ) -> State {
        match systems.scanner.scan_for_first_match(board) {
            Some(line) if is_clearable(board, &line) => {
                debug!(kind = ?line.kind, index = line.index, "line matched");
                State::Clear(line)
            }
            Some(line) => {
                warn!(kind = ?line.kind, index = line.index, "scanner reported an invalid line");
                self.fault(CascadeFault::ScannerReportedInvalidLine, out_events)
            }
            None => State::Settling,
        }
    }

    fn clear(
        &mut self,
        board: &mut Board,
        line: MatchResult,
        out_events: &mut Vec<Event>,
    ) -> State {
        for cell in &line.cells {
            let _ = board.set(*cell, None);
        }
        self.solves += 1;
        out_events.push(Event::LineCleared { line });
        out_events.push(Event::LineSolved {
            cause: self.cause,
            chain: self.solves,
        });
        State::Drop
    }

    fn settle(
        &mut self,
        board: &Board,
        systems: &CascadeSystems,
        out_events: &mut Vec<Event>,
    ) -> State {
        if !systems.scanner.all_matches(board).is_empty() {
            return self.fault(CascadeFault::ScannerMissedMatch, out_events);
        }

        debug!(cause = ?self.cause, solves = self.solves, "cascade settled");
        out_events.push(Event::CascadeEnded {
            cause: self.cause,
            solves: self.solves,
        });

        if systems.probe.has_valid_moves(board) {
            State::Idle
        } else {
            warn!("settled board admits no target-sum line");
            out_events.push(Event::GridUnsolvable);
            State::AwaitingRegeneration
        }
    }

    fn fault(&mut self, fault: CascadeFault, out_events: &mut Vec<Event>) -> State {
        error!(%fault, cause = ?self.cause, "cascade halted");
        out_events.push(Event::CascadeFaulted { fault });
        State::Faulted(fault)
    }
}

/// A reported line may only be cleared if it is a real, fully occupied board
/// line whose values hit the target.
fn is_clearable(board: &Board, line: &MatchResult) -> bool {
    !line.cells.is_empty()
        && line.cells == board.line_cells(line.kind, line.index)
        && line.cells.iter().all(|cell| board.value(*cell).is_some())
        && board.line_sum(line.kind, line.index) == TARGET_SUM
}
