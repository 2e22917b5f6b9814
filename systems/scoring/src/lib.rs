#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Streak and multiplier scoring.
//!
//! The scorer consumes [`Event::LineSolved`] notifications and a paused-aware
//! clock. The first solve of a streak awards the base score; the second awards
//! it again and opens the multiplier window; every later solve inside the
//! window awards `round(base × multiplier) + floor(timer)`, raises the
//! multiplier, and refills the window.

use sum_ten_core::{Event, GameConfig, MultiplierConfig, ScoreState};
use tracing::{debug, info};

/// Configuration parameters required to construct the scorer.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    base_score: u32,
    win_score: u32,
    win_grace_secs: f32,
    multiplier: MultiplierConfig,
}

impl Config {
    /// Creates a configuration from explicit values.
    #[must_use]
    pub const fn new(
        base_score: u32,
        win_score: u32,
        win_grace_secs: f32,
        multiplier: MultiplierConfig,
    ) -> Self {
        Self {
            base_score,
            win_score,
            win_grace_secs,
            multiplier,
        }
    }
}

impl From<&GameConfig> for Config {
    fn from(config: &GameConfig) -> Self {
        Self::new(
            config.base_score,
            config.win_score,
            config.win_grace_secs,
            config.multiplier.clone(),
        )
    }
}

/// Coarse state of the streak.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreakPhase {
    /// No solve is pending.
    Idle,
    /// One solve landed; a second must follow before the streak timeout.
    Streaking,
    /// The multiplier window is open.
    MultiplierActive,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum WinSignal {
    Pending,
    Countdown(f32),
    Sent,
}

/// State machine turning solves and elapsed time into score.
#[derive(Debug)]
pub struct StreakScorer {
    config: Config,
    state: ScoreState,
    phase: StreakPhase,
    win: WinSignal,
}

impl StreakScorer {
    /// Creates a scorer with an empty score.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: ScoreState::default(),
            phase: StreakPhase::Idle,
            win: WinSignal::Pending,
        }
    }

    /// Snapshot of the live scoring state.
    #[must_use]
    pub const fn state(&self) -> ScoreState {
        self.state
    }

    /// Current streak phase.
    #[must_use]
    pub const fn phase(&self) -> StreakPhase {
        self.phase
    }

    /// Discards all score and streak progress.
    pub fn reset(&mut self) {
        self.state = ScoreState::default();
        self.phase = StreakPhase::Idle;
        self.win = WinSignal::Pending;
    }

    /// Consumes world events, awarding points for every scored solve.
    ///
    /// A [`Event::SessionStarted`] resets the scorer. Solves produced by setup
    /// or regeneration cascades are ignored.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        for event in events {
            match event {
                Event::SessionStarted { .. } => self.reset(),
                Event::LineSolved { cause, .. } if cause.is_scored() => self.record_solve(out),
                _ => {}
            }
        }
    }

    /// Advances the multiplier window, streak timeout and deferred win signal.
    ///
    /// Must only be called while no cascade is in flight and no solve reveal is
    /// playing.
    pub fn tick(&mut self, dt: f32, out: &mut Vec<Event>) {
        if !(dt > 0.0) {
            return;
        }

        if self.state.multiplier_active {
            self.drain_multiplier(dt, out);
        } else if self.state.solve_streak > 0 {
            self.state.idle_since_last_solve += dt;
            if self.state.idle_since_last_solve >= self.config.multiplier.streak_timeout_secs {
                debug!(streak = self.state.solve_streak, "streak timed out");
                self.state.solve_streak = 0;
                self.phase = StreakPhase::Idle;
            }
        }

        if let WinSignal::Countdown(remaining) = self.win {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                info!(score = self.state.score, "win threshold reached");
                self.win = WinSignal::Sent;
                out.push(Event::GameWon {
                    score: self.state.score,
                });
            } else {
                self.win = WinSignal::Countdown(remaining);
            }
        }
    }

    /// Reports whether the deferred win signal has been emitted.
    #[must_use]
    pub fn has_signalled_win(&self) -> bool {
        self.win == WinSignal::Sent
    }

    fn record_solve(&mut self, out: &mut Vec<Event>) {
        let multiplier = &self.config.multiplier;
        let base = self.config.base_score;
        let state = &mut self.state;

        state.solve_streak += 1;
        state.idle_since_last_solve = 0.0;

        let delta = match state.solve_streak {
            1 => {
                self.phase = StreakPhase::Streaking;
                base
            }
            2 => {
                state.multiplier_active = true;
                state.multiplier = multiplier.starting;
                state.multiplier_timer = multiplier.duration_secs;
                self.phase = StreakPhase::MultiplierActive;
                base
            }
            _ => {
                let bonus = state.multiplier_timer.floor() as u32;
                let award = (base as f32 * state.multiplier).round() as u32 + bonus;
                state.multiplier += multiplier.increment;
                state.multiplier_timer = multiplier.duration_secs;
                award
            }
        };

        state.score = state.score.saturating_add(delta);
        debug!(
            streak = state.solve_streak,
            delta,
            total = state.score,
            "solve scored"
        );
        out.push(Event::SolveScored {
            total: state.score,
            delta,
        });
        if state.multiplier_active {
            out.push(Event::MultiplierChanged {
                active: true,
                multiplier: state.multiplier,
                timer: state.multiplier_timer,
            });
        }

        if self.win == WinSignal::Pending && self.state.score >= self.config.win_score {
            self.win = WinSignal::Countdown(self.config.win_grace_secs);
        }
    }

    fn drain_multiplier(&mut self, dt: f32, out: &mut Vec<Event>) {
        let state = &mut self.state;
        state.multiplier_timer -= self.config.multiplier.drain_rate * dt;

        if state.multiplier_timer > 0.0 {
            out.push(Event::MultiplierChanged {
                active: true,
                multiplier: state.multiplier,
                timer: state.multiplier_timer,
            });
            return;
        }

        info!(
            multiplier = state.multiplier,
            streak = state.solve_streak,
            "multiplier expired"
        );
        state.multiplier_timer = 0.0;
        state.multiplier = 1.0;
        state.multiplier_active = false;
        state.solve_streak = 0;
        self.phase = StreakPhase::Idle;
        out.push(Event::MultiplierChanged {
            active: false,
            multiplier: 1.0,
            timer: 0.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_grace_wins_on_next_tick() {
        let mut config = GameConfig::default();
        config.win_score = 10;
        config.win_grace_secs = 0.0;
        let mut scorer = StreakScorer::new(Config::from(&config));
        let mut out = Vec::new();

        scorer.record_solve(&mut out);
        assert_eq!(scorer.win, WinSignal::Countdown(0.0));

        scorer.tick(0.016, &mut out);
        assert!(scorer.has_signalled_win());
        assert_eq!(out.last(), Some(&Event::GameWon { score: 10 }));
    }

    #[test]
    fn non_positive_dt_is_ignored() {
        let mut scorer = StreakScorer::new(Config::from(&GameConfig::default()));
        let mut out = Vec::new();
        scorer.record_solve(&mut out);
        out.clear();

        scorer.tick(0.0, &mut out);
        scorer.tick(-1.0, &mut out);
        scorer.tick(f32::NAN, &mut out);

        assert!(out.is_empty());
        assert_eq!(scorer.state().idle_since_last_solve, 0.0);
    }
}
