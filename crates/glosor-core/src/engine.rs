//! Session engine orchestrator.
//!
//! Loads the catalogue for a request, runs sampling, selection and round
//! expansion, and flushes session marks back to the store.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::catalogue::Catalogue;
use crate::error::SessionError;
use crate::model::{CallLanguage, WordFilter};
use crate::rounds::{expand, SessionWord};
use crate::sampler::sample_inflections;
use crate::selector::select;
use crate::session::Session;
use crate::traits::VocabularyStore;

/// What the learner asked to practise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub filter: WordFilter,
    /// Words per round.
    pub n_words: usize,
    pub n_rounds: usize,
    pub call_language: CallLanguage,
}

impl SessionRequest {
    /// Reject requests that cannot produce a session before touching storage.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.n_words == 0 {
            return Err(SessionError::InvalidRequest(
                "words per round must be at least 1".into(),
            ));
        }
        if self.n_rounds == 0 {
            return Err(SessionError::InvalidRequest(
                "rounds must be at least 1".into(),
            ));
        }
        if self.filter.parts_of_speech.is_empty() {
            return Err(SessionError::InvalidRequest(
                "at least one part of speech is required".into(),
            ));
        }
        if self.filter.word_categories.is_empty() {
            return Err(SessionError::InvalidRequest(
                "at least one word category is required".into(),
            ));
        }
        Ok(())
    }
}

/// Select and lay out the questions for one session.
pub fn plan_session<R: Rng + ?Sized>(
    catalogue: &Catalogue,
    request: &SessionRequest,
    rng: &mut R,
) -> Result<Vec<SessionWord>, SessionError> {
    let statistics = sample_inflections(catalogue, rng);
    let selection = select(&statistics, request.n_words, rng);
    if selection.len() < request.n_words {
        tracing::info!(
            requested = request.n_words,
            available = selection.len(),
            "fewer word groups than requested"
        );
    }
    expand(
        &selection.ids(),
        catalogue,
        request.n_rounds,
        request.call_language,
        rng,
    )
}

/// Drives sessions against one store with one random generator.
pub struct SessionEngine<S> {
    store: S,
    rng: ChaCha8Rng,
}

impl<S: VocabularyStore> SessionEngine<S> {
    /// Engine seeded from OS entropy.
    pub fn new(store: S) -> Self {
        Self {
            store,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Engine with a reproducible random sequence.
    pub fn with_seed(store: S, seed: u64) -> Self {
        Self {
            store,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn start_session(&mut self, request: SessionRequest) -> Result<Session, SessionError> {
        request.validate()?;

        let rows = self.store.fetch_candidates(&request.filter)?;
        let catalogue = Catalogue::from_rows(rows);
        if catalogue.is_empty() {
            return Err(SessionError::no_eligible_words(&request.filter));
        }

        let words = plan_session(&catalogue, &request, &mut self.rng)?;
        let session = Session::new(request, words);
        tracing::info!(
            session = %session.id(),
            candidates = catalogue.len(),
            questions = session.total_questions(),
            "session started"
        );
        Ok(session)
    }

    pub fn start_retest(&mut self, session: &mut Session) -> Result<(), SessionError> {
        session.start_retest(&mut self.rng)
    }

    /// Flush pending marks as one batch. Returns how many were written.
    ///
    /// On failure the marks stay pending and the call may be repeated.
    pub fn commit(&mut self, session: &mut Session) -> Result<usize, SessionError> {
        let marks = session.take_pending();
        if marks.is_empty() {
            return Ok(0);
        }
        match self.store.append_marks(&marks) {
            Ok(()) => {
                let count = marks.len();
                session.mark_committed(count);
                tracing::info!(session = %session.id(), marks = count, "marks committed");
                Ok(count)
            }
            Err(source) => {
                let pending = marks.len();
                session.restore_pending(marks);
                tracing::warn!(
                    session = %session.id(),
                    pending,
                    transient = source.is_transient(),
                    "commit failed: {source}"
                );
                Err(SessionError::Commit { pending, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::catalogue::fixtures::{marked, row};
    use crate::error::StoreError;
    use crate::model::{CandidateRow, Mark, PartOfSpeech, WordCategory};
    use crate::traits::{CatalogueSource, MarkSink};

    /// Rows served verbatim; appends recorded, optionally failing first.
    #[derive(Default)]
    struct FakeStore {
        rows: Vec<CandidateRow>,
        appended: RefCell<Vec<Mark>>,
        failures_left: Cell<usize>,
        fetches: Cell<usize>,
    }

    impl CatalogueSource for FakeStore {
        fn fetch_candidates(&self, filter: &WordFilter) -> Result<Vec<CandidateRow>, StoreError> {
            self.fetches.set(self.fetches.get() + 1);
            Ok(self
                .rows
                .iter()
                .filter(|r| filter.matches(r.part_of_speech, r.word_category))
                .cloned()
                .collect())
        }
    }

    impl MarkSink for FakeStore {
        fn append_marks(&self, marks: &[Mark]) -> Result<(), StoreError> {
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(StoreError::Unavailable("database is locked".into()));
            }
            self.appended.borrow_mut().extend_from_slice(marks);
            Ok(())
        }
    }

    fn store_with(n: i64) -> FakeStore {
        FakeStore {
            rows: (1..=n)
                .map(|i| row(i, i, &format!("s{i}"), &format!("t{i}")))
                .collect(),
            ..Default::default()
        }
    }

    fn request(n_words: usize, n_rounds: usize) -> SessionRequest {
        SessionRequest {
            filter: WordFilter::all(),
            n_words,
            n_rounds,
            call_language: CallLanguage::Source,
        }
    }

    fn answer_all(session: &mut Session, wrong: &[i64]) {
        while let Ok(q) = session.current_question() {
            let id: i64 = q.question.trim_start_matches('s').parse().unwrap();
            let text = if wrong.contains(&id) {
                "?".to_string()
            } else {
                format!("t{id}")
            };
            session.submit_answer(&text).unwrap();
        }
    }

    #[test]
    fn invalid_requests_fail_before_fetching() {
        let mut engine = SessionEngine::with_seed(store_with(3), 1);
        for bad in [request(0, 1), request(3, 0)] {
            let err = engine.start_session(bad).unwrap_err();
            assert!(matches!(err, SessionError::InvalidRequest(_)));
        }
        let mut empty_filter = request(3, 1);
        empty_filter.filter.word_categories.clear();
        assert!(engine.start_session(empty_filter).is_err());
        assert_eq!(engine.store().fetches.get(), 0);
    }

    #[test]
    fn empty_catalogue_is_no_eligible_words() {
        let mut engine = SessionEngine::with_seed(store_with(3), 1);
        let mut req = request(3, 1);
        req.filter = WordFilter::new([PartOfSpeech::Verb], [WordCategory::Food]);
        let err = engine.start_session(req).unwrap_err();
        assert!(matches!(err, SessionError::NoEligibleWords { .. }));
    }

    #[test]
    fn session_length_is_selected_words_times_rounds() {
        let mut engine = SessionEngine::with_seed(store_with(10), 3);
        let session = engine.start_session(request(4, 3)).unwrap();
        assert_eq!(session.total_questions(), 12);

        let short = engine.start_session(request(9, 2)).unwrap();
        assert_eq!(short.total_questions(), 18);

        let mut small = SessionEngine::with_seed(store_with(2), 3);
        let shortfall = small.start_session(request(9, 1)).unwrap();
        assert_eq!(shortfall.total_questions(), 2);
    }

    #[test]
    fn struggling_word_is_always_picked() {
        let mut rows: Vec<CandidateRow> = (1..=12)
            .map(|i| marked(row(i, i, &format!("s{i}"), &format!("t{i}")), 1, i))
            .collect();
        rows.push(marked(row(1, 1, "s1", "t1"), 0, 100));
        let store = FakeStore {
            rows,
            ..Default::default()
        };
        let mut engine = SessionEngine::with_seed(store, 8);
        for _ in 0..10 {
            let mut session = engine.start_session(request(3, 1)).unwrap();
            let mut ids = Vec::new();
            while let Ok(q) = session.current_question() {
                ids.push(q.question.clone());
                session.submit_answer("").unwrap();
            }
            assert!(ids.contains(&"s1".to_string()), "{ids:?}");
        }
    }

    #[test]
    fn commit_writes_primary_marks_only() {
        let mut engine = SessionEngine::with_seed(store_with(3), 4);
        let mut session = engine.start_session(request(3, 1)).unwrap();
        answer_all(&mut session, &[2]);
        assert!(session.has_pending_retest());
        engine.start_retest(&mut session).unwrap();
        assert_eq!(session.total_questions(), 2);
        answer_all(&mut session, &[2]);
        assert!(session.is_finished());

        assert_eq!(engine.commit(&mut session).unwrap(), 3);
        assert_eq!(engine.store().appended.borrow().len(), 3);
        assert_eq!(engine.commit(&mut session).unwrap(), 0);
    }

    #[test]
    fn failed_commit_keeps_marks_for_retry() {
        let store = store_with(3);
        store.failures_left.set(1);
        let mut engine = SessionEngine::with_seed(store, 4);
        let mut session = engine.start_session(request(3, 1)).unwrap();
        answer_all(&mut session, &[]);

        let err = engine.commit(&mut session).unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, SessionError::Commit { pending: 3, .. }));
        assert_eq!(session.pending_marks().len(), 3);
        assert!(engine.store().appended.borrow().is_empty());

        assert_eq!(engine.commit(&mut session).unwrap(), 3);
        assert!(session.pending_marks().is_empty());
        assert_eq!(session.report().committed_marks, 3);
    }

    #[test]
    fn same_seed_same_session() {
        let questions = |seed| {
            let mut engine = SessionEngine::with_seed(store_with(20), seed);
            let mut session = engine.start_session(request(6, 2)).unwrap();
            let mut seen = Vec::new();
            while let Ok(q) = session.current_question() {
                seen.push(q.question);
                session.submit_answer("").unwrap();
            }
            seen
        };
        assert_eq!(questions(77), questions(77));
    }
}
