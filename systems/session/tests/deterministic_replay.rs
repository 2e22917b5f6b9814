use std::{cell::RefCell, rc::Rc};

use sum_ten_core::{Board, Difficulty, Event, GameConfig, ScoreState};
use sum_ten_system_session::{EventFilter, Session, SessionStatus};
use sum_ten_world::query;

const FRAME_SECS: f32 = 0.05;
const MOVES: usize = 12;
const MAX_FRAMES: usize = 10_000;

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    board: Board,
    score: ScoreState,
    status: SessionStatus,
    events: Vec<Event>,
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut session = Session::new(GameConfig::default(), seed);
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let _ = session.subscribe(EventFilter::All, move |event| {
        sink.borrow_mut().push(event.clone())
    });

    session
        .start(Difficulty::Normal)
        .expect("fresh session accepts start");
    for _ in 0..MOVES {
        settle(&mut session);
        session.update(FRAME_SECS);
        let Some(hint) = session.request_hint() else {
            continue;
        };
        let target = hint.target().expect("hint stays on the board");
        session
            .request_swap(hint.origin, target)
            .expect("hinted swap is legal");
    }
    settle(&mut session);

    let board = query::board(session.world()).clone();
    let events = log.borrow().clone();
    ReplayOutcome {
        board,
        score: session.score(),
        status: session.status(),
        events,
    }
}

fn settle(session: &mut Session) {
    let mut frames = 0;
    while session.is_running() && !session.is_idle() {
        session.update(FRAME_SECS);
        frames += 1;
        assert!(frames < MAX_FRAMES, "session never settled");
    }
}

#[test]
fn deterministic_replay_produces_identical_outcome() {
    let first = replay(0x00c0_ffee);
    let second = replay(0x00c0_ffee);

    assert_eq!(first, second, "replay diverged between runs");
    assert!(
        first
            .events
            .iter()
            .any(|event| matches!(event, Event::SolveScored { .. })),
        "hinted moves should score"
    );
}

#[test]
fn score_is_monotonic_across_a_replay() {
    let outcome = replay(0x0bad_5eed);
    let totals: Vec<u32> = outcome
        .events
        .iter()
        .filter_map(|event| match event {
            Event::SolveScored { total, .. } => Some(*total),
            _ => None,
        })
        .collect();

    assert!(totals.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(totals.last().copied().unwrap_or(0), outcome.score.score);
}
