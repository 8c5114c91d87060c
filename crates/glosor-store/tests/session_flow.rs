//! Session engine integration tests against real storage backends.
//!
//! Words are named `s{n}` / `t{n}` so tests can answer by looking the
//! question up in the word list they inserted.

use std::collections::HashMap;

use glosor_core::engine::{SessionEngine, SessionRequest};
use glosor_core::error::SessionError;
use glosor_core::model::{
    CallLanguage, GrammarCategory, PartOfSpeech, WordCategory, WordEntry, WordFilter, WordPair,
};
use glosor_core::session::Session;
use glosor_core::traits::VocabularyStore;
use glosor_store::{MemoryStore, SqliteStore};

fn word(n: usize) -> WordEntry {
    WordEntry {
        part_of_speech: PartOfSpeech::Noun,
        word_category: WordCategory::General,
        context_hint: None,
        link: None,
        forms: [(
            GrammarCategory::None,
            WordPair::new(format!("s{n}"), format!("t{n}")),
        )]
        .into_iter()
        .collect(),
    }
}

fn answers(n: usize) -> HashMap<String, String> {
    (1..=n).map(|i| (format!("s{i}"), format!("t{i}"))).collect()
}

fn sqlite_with(n: usize) -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    for i in 1..=n {
        store.insert_word_group(&word(i)).unwrap();
    }
    store
}

fn request(n_words: usize, n_rounds: usize, call_language: CallLanguage) -> SessionRequest {
    SessionRequest {
        filter: WordFilter::all(),
        n_words,
        n_rounds,
        call_language,
    }
}

/// Answer until the pass ends; questions in `wrong` get a wrong answer.
fn play_pass(session: &mut Session, key: &HashMap<String, String>, wrong: &[&str]) -> Vec<String> {
    let mut asked = Vec::new();
    while let Ok(question) = session.current_question() {
        let text = if wrong.contains(&question.question.as_str()) {
            "wrong".to_string()
        } else {
            key[&question.question].clone()
        };
        let outcome = session.submit_answer(&text).unwrap();
        assert_eq!(outcome.correct, !wrong.contains(&question.question.as_str()));
        asked.push(question.question);
    }
    asked
}

#[test]
fn retest_answers_are_never_committed() {
    let store = sqlite_with(3);
    let key = answers(3);
    let mut engine = SessionEngine::with_seed(store, 11);

    let mut session = engine
        .start_session(request(3, 1, CallLanguage::Source))
        .unwrap();
    assert_eq!(session.total_questions(), 3);
    play_pass(&mut session, &key, &["s2"]);

    assert!(session.has_pending_retest());
    engine.start_retest(&mut session).unwrap();
    assert_eq!(session.total_questions(), 2);
    let retested = play_pass(&mut session, &key, &[]);
    assert_eq!(retested, vec!["s2", "s2"]);
    assert!(session.is_finished());

    assert_eq!(engine.commit(&mut session).unwrap(), 3);
    assert_eq!(engine.store().mark_count().unwrap(), 3);

    let report = session.report();
    assert_eq!(report.answered, 3);
    assert_eq!(report.correct, 2);
    assert_eq!(report.missed.len(), 1);
    assert_eq!(report.missed[0].question, "s2");
}

#[test]
fn committed_misses_bring_the_word_back() {
    let store = sqlite_with(12);
    let key = answers(12);
    let mut engine = SessionEngine::with_seed(store, 5);

    // Ask every word once and miss s7.
    let mut first = engine
        .start_session(request(12, 1, CallLanguage::Source))
        .unwrap();
    play_pass(&mut first, &key, &["s7"]);
    first.finish();
    engine.commit(&mut first).unwrap();

    for _ in 0..10 {
        let mut next = engine
            .start_session(request(3, 1, CallLanguage::Source))
            .unwrap();
        let asked = play_pass(&mut next, &key, &["s7"]);
        assert!(asked.contains(&"s7".to_string()), "{asked:?}");
        next.abandon();
    }
}

#[test]
fn abandoned_session_writes_nothing() {
    let mut engine = SessionEngine::with_seed(sqlite_with(4), 2);
    let mut session = engine
        .start_session(request(4, 2, CallLanguage::Source))
        .unwrap();
    play_pass(&mut session, &answers(4), &[]);
    session.abandon();
    assert_eq!(engine.commit(&mut session).unwrap(), 0);
    assert_eq!(engine.store().mark_count().unwrap(), 0);
}

#[test]
fn commit_survives_a_transient_failure() {
    let store = MemoryStore::new();
    for i in 1..=4 {
        store.insert_word_group(&word(i)).unwrap();
    }
    store.fail_next_appends(1).unwrap();
    let key: HashMap<String, String> = answers(4).into_iter().map(|(s, t)| (t, s)).collect();
    let mut engine = SessionEngine::with_seed(store, 9);

    let mut session = engine
        .start_session(request(4, 1, CallLanguage::Target))
        .unwrap();
    play_pass(&mut session, &key, &[]);

    let err = engine.commit(&mut session).unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(err, SessionError::Commit { pending: 4, .. }));
    assert_eq!(session.pending_marks().len(), 4);

    assert_eq!(engine.commit(&mut session).unwrap(), 4);
    let marks = engine.store().marks().unwrap();
    assert_eq!(marks.len(), 4);
    assert!(marks.iter().all(|m| m.direction == 2 && m.is_correct()));
    assert_eq!(engine.store().append_calls(), 2);
}

#[test]
fn filters_with_no_words_are_reported() {
    let mut engine = SessionEngine::with_seed(sqlite_with(2), 1);
    let mut req = request(3, 1, CallLanguage::Source);
    req.filter = WordFilter::new([PartOfSpeech::Verb], WordCategory::ALL);
    let err = engine.start_session(req).unwrap_err();
    assert!(matches!(err, SessionError::NoEligibleWords { .. }));
    assert!(err.to_string().contains("verb"));
}

#[test]
fn boxed_stores_drive_the_engine() {
    let store: Box<dyn VocabularyStore> = Box::new(sqlite_with(2));
    let mut engine = SessionEngine::with_seed(store, 3);
    let session = engine
        .start_session(request(9, 1, CallLanguage::Source))
        .unwrap();
    assert_eq!(session.total_questions(), 2);
}
