use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::{rngs::StdRng, SeedableRng};

use rapidtype::{
    language::Language,
    passage::Status,
    runtime::{
        AppEvent, AppEventSource, ChannelTickScheduler, FixedTicker, Runner, TestEventSource,
    },
    timer::{ManualTickScheduler, Phase},
    App, Event, Flow, Session, SessionConfig,
};

// Headless integration using the library runtime + Session without a TTY.

fn cat_dog_session(duration_secs: u32) -> Session {
    // a single corpus entry makes the passage predictable
    let language = Language {
        name: "test".to_string(),
        size: 1,
        words: vec!["cat dog".to_string()],
    };
    Session::with_rng(
        language,
        SessionConfig {
            number_of_words: 1,
            duration_secs,
        },
        Box::new(ManualTickScheduler::new()),
        Box::new(StdRng::seed_from_u64(0)),
    )
    .unwrap()
}

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn run_clock(session: &mut Session) {
    let id = session.live_tick().expect("timer should be running");
    for _ in 0..session.config().duration_secs {
        session.apply(Event::Tick(id)).unwrap();
    }
}

#[test]
fn all_correct_passage_scores_completed_words() {
    let mut session = cat_dog_session(30);
    for c in "cat dog".chars() {
        session.apply(Event::Character(c)).unwrap();
    }
    run_clock(&mut session);

    let results = session.results().expect("finished session has results");
    // "dog" has no terminating space, so only "cat" is a completed word
    assert_eq!(results.wpm, 2);
    assert_eq!(results.raw_wpm, 2);
    assert_eq!(results.accuracy_label(), "100.00");
}

#[test]
fn one_wrong_character_spoils_the_word() {
    let mut session = cat_dog_session(30);
    for c in "cax dog".chars() {
        session.apply(Event::Character(c)).unwrap();
    }
    run_clock(&mut session);

    let results = session.results().unwrap();
    assert_eq!(results.wpm, 0);
    // incorrect characters still finish a raw word, so "cax " counts there
    assert_eq!(results.raw_wpm, 2);
    assert_eq!(results.accuracy_label(), "85.71");
    assert_eq!(results.correct_chars, 6);
    assert_eq!(results.incorrect_chars, 1);
}

#[test]
fn reset_mid_typing_discards_in_flight_tick() {
    let scheduler = ManualTickScheduler::new();
    let mut session = Session::new(
        Language::new("english").unwrap(),
        SessionConfig::default(),
        Box::new(scheduler.clone()),
    )
    .unwrap();

    session.apply(Event::Character('a')).unwrap();
    session.apply(Event::Character('b')).unwrap();
    let in_flight = session.live_tick().unwrap();

    session.apply(Event::Reset).unwrap();
    // the tick was already queued when reset happened
    session.apply(Event::Tick(in_flight)).unwrap();

    assert!(scheduler.is_cancelled(in_flight));
    assert_eq!(session.timer().elapsed_secs(), 0);
    assert_eq!(session.timer().phase(), Phase::Idle);
    assert_eq!(session.cursor_pos(), 0);
    assert!(session
        .passage()
        .entries()
        .iter()
        .all(|e| e.status == Status::Pending));
}

#[test]
fn headless_timed_session_finishes_by_real_ticks() {
    // Timed session driven by the thread backed scheduler at a fast interval
    let es = TestEventSource::new();
    let scheduler =
        ChannelTickScheduler::new(es.sender(), FixedTicker::new(Duration::from_millis(5)));
    let session = Session::new(
        Language::from_word_list("test", "hello").unwrap(),
        SessionConfig {
            number_of_words: 3,
            duration_secs: 3,
        },
        Box::new(scheduler),
    )
    .unwrap();
    let mut app = App::new(session, "test");

    let tx = es.sender();
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(50)));
    tx.send(key('h')).unwrap();
    tx.send(key('e')).unwrap();

    for _ in 0..200u32 {
        if let Some(ev) = runner.step() {
            assert_ne!(app.handle_event(ev), Flow::Quit);
        }
        if app.session.is_finished() {
            break;
        }
    }

    assert!(
        app.session.is_finished(),
        "timed session should finish by timeout"
    );
    assert_eq!(app.session.timer().elapsed_secs(), 3);
    assert_eq!(app.session.live_tick(), None);

    // late ticks from the finished stream change nothing
    let frozen = app.session.snapshot();
    for _ in 0..5u32 {
        if let Some(ev) = runner.step() {
            app.handle_event(ev);
        }
    }
    assert_eq!(app.session.snapshot(), frozen);
}

#[test]
fn keys_after_expiry_are_noops() {
    let es = TestEventSource::new();
    let scheduler = ManualTickScheduler::new();
    let session = Session::new(
        Language::from_word_list("test", "hello").unwrap(),
        SessionConfig {
            number_of_words: 2,
            duration_secs: 1,
        },
        Box::new(scheduler.clone()),
    )
    .unwrap();
    let mut app = App::new(session, "test");
    let tx = es.sender();
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));

    tx.send(key('h')).unwrap();
    let mut steps = 0;
    while app.session.live_tick().is_none() && steps < 10 {
        if let Some(ev) = runner.step() {
            app.handle_event(ev);
        }
        steps += 1;
    }
    let id = scheduler.last_issued().unwrap();
    tx.send(AppEvent::Tick(id)).unwrap();
    tx.send(key('e')).unwrap();
    tx.send(AppEvent::Key(KeyEvent::new(
        KeyCode::Backspace,
        KeyModifiers::NONE,
    )))
    .unwrap();
    for _ in 0..3 {
        if let Some(ev) = runner.step() {
            app.handle_event(ev);
        }
    }

    assert!(app.session.is_finished());
    assert_eq!(app.session.cursor_pos(), 1);
    assert_eq!(app.session.passage().status(0), Some(Status::Correct));
}
