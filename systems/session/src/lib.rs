#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestration for the Sum Ten engine.
//!
//! A [`Session`] owns the world and every system, wired together by
//! construction. Hosts drive it with [`Session::update`] once per frame and
//! observe it through the [`EventBus`].

pub mod bus;

use sum_ten_core::{
    Board, CellCoord, Command, Difficulty, Event, GameConfig, HintMove, Rejection, ScoreState,
};
use sum_ten_system_hinting::HintAdvisor;
use sum_ten_system_match_detection::MatchDetector;
use sum_ten_system_scoring::{Config as ScoringConfig, StreakScorer};
use sum_ten_system_solvability::SolvabilityAnalyzer;
use sum_ten_world::{self as world, query, CascadeStatus, CascadeSystems, World};
use tracing::{error, info};

pub use bus::{EventBus, EventFilter, SubscriptionId};

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// No session has been started.
    NotStarted,
    /// Accepting input and running clocks.
    Running,
    /// Ended at or above the win score.
    Won {
        /// Final score.
        score: u32,
    },
    /// The clock ran out below the win score.
    Lost {
        /// Final score.
        score: u32,
    },
}

/// Owns the world and systems of one game and routes events between them.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    world: World,
    scorer: StreakScorer,
    hints: HintAdvisor,
    bus: EventBus,
    status: SessionStatus,
    remaining: f32,
    presentation_hold: bool,
    regeneration_delay: Option<f32>,
}

impl Session {
    /// Builds a session and its collaborators from `config`.
    ///
    /// `config` is expected to have passed [`GameConfig::validate`].
    #[must_use]
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let systems = CascadeSystems {
            scanner: Box::new(MatchDetector::new()),
            probe: Box::new(SolvabilityAnalyzer::new()),
        };
        let scorer = StreakScorer::new(ScoringConfig::from(&config));
        let remaining = config.session_secs;
        Self {
            world: World::new(config.clone(), seed, systems),
            config,
            scorer,
            hints: HintAdvisor::new(),
            bus: EventBus::new(),
            status: SessionStatus::NotStarted,
            remaining,
            presentation_hold: false,
            regeneration_delay: None,
        }
    }

    /// Registers an event subscriber.
    pub fn subscribe<F>(&mut self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.bus.subscribe(filter, handler)
    }

    /// Removes an event subscriber.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Starts a fresh session with a random board.
    ///
    /// Rejected while a cascade is in flight.
    pub fn start(&mut self, difficulty: Difficulty) -> Result<(), Rejection> {
        let mut events = Vec::new();
        let result = self.world.start_session(difficulty, &mut events);
        self.finish_reset(result, events)
    }

    /// Starts a fresh session from a preset layout.
    pub fn restore(&mut self, difficulty: Difficulty, board: Board) -> Result<(), Rejection> {
        let mut events = Vec::new();
        let result = self.world.restore(difficulty, board, &mut events);
        self.finish_reset(result, events)
    }

    fn finish_reset(
        &mut self,
        result: Result<(), Rejection>,
        mut events: Vec<Event>,
    ) -> Result<(), Rejection> {
        match result {
            Ok(()) => {
                self.status = SessionStatus::Running;
                self.remaining = self.config.session_secs;
                self.presentation_hold = false;
                self.regeneration_delay = None;
                info!(
                    difficulty = query::difficulty(&self.world).as_str(),
                    seconds = self.remaining,
                    "session running"
                );
            }
            Err(reason) => events.push(Event::CommandRejected { reason }),
        }
        self.dispatch(events);
        result
    }

    /// Requests a swap of two adjacent tiles.
    pub fn request_swap(&mut self, a: CellCoord, b: CellCoord) -> Result<(), Rejection> {
        let mut events = Vec::new();
        let result = if self.is_running() {
            self.world.request_swap(a, b, &mut events)
        } else {
            Err(Rejection::SessionNotRunning)
        };
        if let Err(reason) = result {
            events.push(Event::SwapRejected { a, b, reason });
        }
        self.dispatch(events);
        result
    }

    /// Suggests a swap that would solve a line, if the board is stable.
    #[must_use]
    pub fn request_hint(&self) -> Option<HintMove> {
        if !self.is_running() || !query::is_idle(&self.world) {
            return None;
        }
        self.hints.find_hint(query::board(&self.world))
    }

    /// Pauses the session and multiplier clocks while a solve reveal plays.
    pub fn set_presentation_hold(&mut self, hold: bool) {
        self.presentation_hold = hold;
    }

    /// Advances the session by one frame of `dt` seconds.
    ///
    /// An in-flight cascade advances by one phase and the clocks stay paused.
    /// Once the board is stable and no presentation hold is active, the
    /// scorer and session clock run. An unsolvable board is regenerated after
    /// the settle delay, counted from the frame after it was reported.
    pub fn update(&mut self, dt: f32) {
        if !self.is_running() {
            return;
        }

        let pending_regeneration = self.regeneration_delay.is_some();
        let mut events = Vec::new();
        let advanced = world::step(&mut self.world, &mut events);
        self.dispatch(events);

        if let Some(delay) = self.regeneration_delay {
            // The frame that parks the board does not eat into the delay.
            if pending_regeneration {
                self.count_down_regeneration(delay - dt.max(0.0));
            }
            return;
        }

        if !advanced && query::is_idle(&self.world) && !self.presentation_hold {
            self.run_clocks(dt);
        }
    }

    /// Steps the cascade until the world stops changing or `max_steps` is hit.
    ///
    /// Clocks do not run. Returns the number of phases executed.
    pub fn run_until_stable(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps {
            let mut events = Vec::new();
            if !world::step(&mut self.world, &mut events) {
                break;
            }
            steps += 1;
            self.dispatch(events);
        }
        steps
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Live scoring state.
    #[must_use]
    pub fn score(&self) -> ScoreState {
        self.scorer.state()
    }

    /// Seconds left on the session clock.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Reports whether the session accepts input.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    /// Reports whether the board is stable and accepting swaps.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        query::is_idle(&self.world)
    }

    /// State of the cascade resolver.
    #[must_use]
    pub fn cascade_status(&self) -> CascadeStatus {
        query::cascade_status(&self.world)
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn count_down_regeneration(&mut self, delay: f32) {
        if delay > 0.0 {
            self.regeneration_delay = Some(delay);
            return;
        }

        self.regeneration_delay = None;
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::RegenerateBoard, &mut events);
        self.dispatch(events);
    }

    fn run_clocks(&mut self, dt: f32) {
        if !(dt > 0.0) {
            return;
        }

        let mut events = Vec::new();
        self.scorer.tick(dt, &mut events);
        self.remaining = (self.remaining - dt).max(0.0);
        events.push(Event::SessionTimeChanged {
            remaining: self.remaining,
        });

        if self.remaining <= 0.0 && !self.scorer.has_signalled_win() {
            let score = self.scorer.state().score;
            if score >= self.config.win_score {
                events.push(Event::GameWon { score });
            } else {
                events.push(Event::GameLost { score });
            }
        }
        self.dispatch(events);
    }

    /// Feeds events to the scorer, reacts to lifecycle events, then publishes
    /// the originals followed by everything the scorer derived.
    fn dispatch(&mut self, events: Vec<Event>) {
        if events.is_empty() {
            return;
        }

        let mut derived = Vec::new();
        self.scorer.handle(&events, &mut derived);

        for event in events.iter().chain(derived.iter()) {
            self.observe(event);
            self.bus.publish(event);
        }
    }

    fn observe(&mut self, event: &Event) {
        match event {
            Event::GridUnsolvable => {
                self.regeneration_delay = Some(self.config.unsolvable_settle_secs);
            }
            Event::CascadeFaulted { fault } => {
                error!(%fault, "cascade faulted; start a new session to recover");
            }
            Event::GameWon { score } if self.is_running() => {
                info!(score, "session won");
                self.status = SessionStatus::Won { score: *score };
            }
            Event::GameLost { score } if self.is_running() => {
                info!(score, "session lost");
                self.status = SessionStatus::Lost { score: *score };
            }
            _ => {}
        }
    }
}
