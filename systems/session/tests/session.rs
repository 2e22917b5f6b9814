use std::{cell::RefCell, rc::Rc};

use sum_ten_core::{
    Board, CascadeCause, CellCoord, Difficulty, Event, EventKind, GameConfig, LineScanner,
    Rejection,
};
use sum_ten_system_match_detection::MatchDetector;
use sum_ten_system_session::{EventFilter, Session, SessionStatus};
use sum_ten_world::{query, CascadeStatus};

const MAX_STEPS: usize = 10_000;
const FRAME_SECS: f32 = 0.25;

fn near_miss_board() -> Board {
    Board::from_rows(&[
        [1, 2, 3, 2, 6],
        [6, 6, 6, 6, 2],
        [6, 6, 6, 6, 6],
        [6, 6, 6, 6, 6],
        [6, 6, 6, 6, 6],
    ])
    .expect("square rows")
}

fn recorded(session: &mut Session, filter: EventFilter) -> Rc<RefCell<Vec<Event>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let _ = session.subscribe(filter, move |event| sink.borrow_mut().push(event.clone()));
    log
}

/// Drives frames until the board is stable, riding out any regeneration pause.
fn settle(session: &mut Session) {
    let mut frames = 0;
    while !session.is_idle() {
        session.update(FRAME_SECS);
        frames += 1;
        assert!(frames < MAX_STEPS, "board never settled");
    }
    assert_eq!(session.cascade_status(), CascadeStatus::Idle);
}

fn play_hint(session: &mut Session) {
    let hint = session.request_hint().expect("row 0 can be completed");
    let target = hint.target().expect("hint stays on the board");
    session
        .request_swap(hint.origin, target)
        .expect("adjacent swap is accepted");
}

#[test]
fn started_session_settles_without_pending_matches() {
    let mut session = Session::new(GameConfig::default(), 11);
    let log = recorded(&mut session, EventFilter::All);

    session.start(Difficulty::Hard).expect("idle world accepts start");
    settle(&mut session);

    assert_eq!(session.status(), SessionStatus::Running);
    let board = query::board(session.world());
    assert_eq!((board.width(), board.height()), (6, 6));
    assert!(board.is_full());
    assert!(MatchDetector::new().all_matches(board).is_empty());
    assert_eq!(session.score().score, 0, "setup solves are not scored");
    assert!(matches!(
        log.borrow().first(),
        Some(Event::SessionStarted {
            difficulty: Difficulty::Hard,
            ..
        })
    ));
}

#[test]
fn hinted_swap_scores_base_points() {
    let mut session = Session::new(GameConfig::default(), 3);
    let scores = recorded(&mut session, EventFilter::Only(vec![EventKind::SolveScored]));

    session
        .restore(Difficulty::Normal, near_miss_board())
        .expect("layout fits the normal tier");
    settle(&mut session);

    play_hint(&mut session);
    assert!(session.request_hint().is_none(), "no hints mid-cascade");
    settle(&mut session);

    assert!(session.score().score >= 10);
    assert_eq!(
        scores.borrow().first(),
        Some(&Event::SolveScored {
            total: 10,
            delta: 10,
        })
    );
}

#[test]
fn diagonal_swap_is_rejected_and_published() {
    let mut session = Session::new(GameConfig::default(), 5);
    let rejections = recorded(&mut session, EventFilter::Only(vec![EventKind::SwapRejected]));
    session
        .restore(Difficulty::Normal, near_miss_board())
        .expect("layout fits the normal tier");
    settle(&mut session);
    let before = query::board(session.world()).clone();

    let a = CellCoord::new(0, 0);
    let b = CellCoord::new(1, 1);
    assert_eq!(session.request_swap(a, b), Err(Rejection::NotAdjacent));

    assert_eq!(query::board(session.world()), &before);
    assert_eq!(
        *rejections.borrow(),
        vec![Event::SwapRejected {
            a,
            b,
            reason: Rejection::NotAdjacent,
        }]
    );
}

#[test]
fn swaps_before_start_are_rejected() {
    let mut session = Session::new(GameConfig::default(), 5);
    assert_eq!(
        session.request_swap(CellCoord::new(0, 0), CellCoord::new(1, 0)),
        Err(Rejection::SessionNotRunning)
    );
    assert_eq!(session.status(), SessionStatus::NotStarted);
}

#[test]
fn clock_pauses_while_cascade_resolves() {
    let config = GameConfig::default();
    let total = config.session_secs;
    let mut session = Session::new(config, 9);
    session
        .restore(Difficulty::Normal, near_miss_board())
        .expect("layout fits the normal tier");
    settle(&mut session);

    play_hint(&mut session);

    let mut frames = 0;
    while !session.is_idle() {
        session.update(1.0);
        frames += 1;
        assert!(frames < MAX_STEPS, "cascade never settled");
    }
    assert_eq!(session.remaining(), total);

    session.update(1.0);
    assert_eq!(session.remaining(), total - 1.0);
}

#[test]
fn presentation_hold_pauses_clock() {
    let config = GameConfig::default();
    let total = config.session_secs;
    let mut session = Session::new(config, 21);
    session
        .restore(Difficulty::Normal, near_miss_board())
        .expect("layout fits the normal tier");
    settle(&mut session);

    session.set_presentation_hold(true);
    session.update(5.0);
    assert_eq!(session.remaining(), total);

    session.set_presentation_hold(false);
    session.update(5.0);
    assert_eq!(session.remaining(), total - 5.0);
}

#[test]
fn clock_expiry_below_threshold_loses() {
    let mut config = GameConfig::default();
    config.session_secs = 1.0;
    let mut session = Session::new(config, 13);
    let outcome = recorded(
        &mut session,
        EventFilter::Only(vec![EventKind::GameWon, EventKind::GameLost]),
    );
    session
        .restore(Difficulty::Normal, near_miss_board())
        .expect("layout fits the normal tier");
    settle(&mut session);

    session.update(0.6);
    assert!(session.is_running());
    session.update(0.6);

    assert_eq!(session.status(), SessionStatus::Lost { score: 0 });
    assert_eq!(session.remaining(), 0.0);
    assert_eq!(*outcome.borrow(), vec![Event::GameLost { score: 0 }]);

    session.update(1.0);
    assert_eq!(outcome.borrow().len(), 1, "ended sessions stay quiet");
}

#[test]
fn reaching_win_score_wins_after_grace() {
    let mut config = GameConfig::default();
    config.win_score = 10;
    config.win_grace_secs = 0.2;
    let mut session = Session::new(config, 17);
    session
        .restore(Difficulty::Normal, near_miss_board())
        .expect("layout fits the normal tier");
    settle(&mut session);

    play_hint(&mut session);
    settle(&mut session);
    assert!(session.is_running(), "win waits for the grace period");

    session.update(0.1);
    assert!(session.is_running());
    session.update(0.15);

    let score = session.score().score;
    assert_eq!(session.status(), SessionStatus::Won { score });
}

#[test]
fn unsolvable_board_regenerates_after_settle_delay() {
    let config = GameConfig::default();
    let total = config.session_secs;
    let mut session = Session::new(config, 23);
    let log = recorded(&mut session, EventFilter::All);

    session
        .restore(Difficulty::Normal, Board::from_rows(&[[6_u8; 5]; 5]).expect("square"))
        .expect("sixes fit the normal tier");
    let _ = session.run_until_stable(MAX_STEPS);
    assert_eq!(session.cascade_status(), CascadeStatus::AwaitingRegeneration);
    assert!(log.borrow().contains(&Event::GridUnsolvable));

    session.update(0.5);
    assert_eq!(session.cascade_status(), CascadeStatus::AwaitingRegeneration);
    session.update(0.5);
    assert!(log.borrow().contains(&Event::BoardRegenerated));
    assert!(log.borrow().contains(&Event::CascadeStarted {
        cause: CascadeCause::Regeneration,
    }));

    let _ = session.run_until_stable(MAX_STEPS);
    assert_eq!(session.score().score, 0, "regeneration is never scored");
    assert_eq!(session.remaining(), total);
}

#[test]
fn scored_swap_onto_unsolvable_board_regenerates_then_settles() {
    let config = GameConfig::default();
    let total = config.session_secs;
    let mut session = Session::new(config, 3);
    let log = recorded(&mut session, EventFilter::All);
    session
        .restore(Difficulty::Normal, near_miss_board())
        .expect("layout fits the normal tier");
    settle(&mut session);

    play_hint(&mut session);
    let _ = session.run_until_stable(MAX_STEPS);
    assert_eq!(session.cascade_status(), CascadeStatus::AwaitingRegeneration);
    assert_eq!(session.score().score, 10);

    settle(&mut session);
    assert!(session.is_running());
    assert!(log.borrow().contains(&Event::BoardRegenerated));
    assert_eq!(session.score().score, 10, "regeneration adds no score");
    assert_eq!(session.remaining(), total, "regeneration pause is not play time");
    assert!(MatchDetector::new()
        .all_matches(query::board(session.world()))
        .is_empty());
}

#[test]
fn settle_delay_starts_after_the_unsolvable_frame() {
    let mut config = GameConfig::default();
    config.unsolvable_settle_secs = 0.5;
    let mut session = Session::new(config, 29);
    let log = recorded(&mut session, EventFilter::All);
    session
        .restore(Difficulty::Normal, Board::from_rows(&[[6_u8; 5]; 5]).expect("square"))
        .expect("sixes fit the normal tier");

    let mut frames = 0;
    while !log.borrow().contains(&Event::GridUnsolvable) {
        session.update(1.0);
        frames += 1;
        assert!(frames < MAX_STEPS, "board never settled");
    }
    assert_eq!(session.cascade_status(), CascadeStatus::AwaitingRegeneration);
    assert!(!log.borrow().contains(&Event::BoardRegenerated));

    session.update(1.0);
    assert!(log.borrow().contains(&Event::BoardRegenerated));
}
