//! The session state machine.
//!
//! A session walks a flat list of questions (`n_words × n_rounds`). Wrong
//! answers in the primary pass are collected into the incorrect set; once the
//! pass ends the learner may take one retest of those words over two rounds.
//! Retest answers are checked but never recorded.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::SessionRequest;
use crate::error::SessionError;
use crate::model::{InflectionId, Mark};
use crate::report::{MissedWord, SessionReport};
use crate::rounds::{expand_rounds, SessionWord};
use crate::statistics::score_percent;

/// Number of rounds a retest runs for.
pub const RETEST_ROUNDS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    AwaitingAnswer,
    /// The primary pass is over and a retest is on offer.
    RoundComplete,
    Finished,
}

impl SessionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::AwaitingAnswer => "awaiting an answer",
            SessionPhase::RoundComplete => "waiting for a retest decision",
            SessionPhase::Finished => "finished",
        }
    }
}

/// Position of the current question, all counters 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub question_in_round: usize,
    pub questions_per_round: usize,
    pub round_number: usize,
    pub total_rounds: usize,
}

impl Progress {
    fn at(index: usize, questions_per_round: usize, total_rounds: usize) -> Self {
        let per_round = questions_per_round.max(1);
        Self {
            question_in_round: index % per_round + 1,
            questions_per_round,
            round_number: index / per_round + 1,
            total_rounds,
        }
    }
}

/// What the presentation layer shows for the current question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub grammar_hint: Option<String>,
    pub context_hint: Option<String>,
    pub link: Option<String>,
    pub progress: Progress,
    pub retest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// Every accepted variant, for display.
    pub correct_answer: String,
}

/// One practice session.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    request: SessionRequest,
    started_at: DateTime<Utc>,
    phase: SessionPhase,
    words: Vec<SessionWord>,
    index: usize,
    rounds: usize,
    questions_per_round: usize,
    incorrect: Vec<SessionWord>,
    pending: Vec<Mark>,
    retest: bool,
    retest_taken: bool,
    /// Every mark produced by the primary pass, committed or not.
    recorded: Vec<Mark>,
    missed: Vec<SessionWord>,
    committed: usize,
}

impl Session {
    /// `words` must already be expanded over `request.n_rounds` rounds.
    pub(crate) fn new(request: SessionRequest, words: Vec<SessionWord>) -> Self {
        let rounds = request.n_rounds;
        let questions_per_round = words.len() / rounds.max(1);
        let phase = if words.is_empty() {
            SessionPhase::Finished
        } else {
            SessionPhase::AwaitingAnswer
        };
        Self {
            id: Uuid::new_v4(),
            request,
            started_at: Utc::now(),
            phase,
            words,
            index: 0,
            rounds,
            questions_per_round,
            incorrect: Vec::new(),
            pending: Vec::new(),
            retest: false,
            retest_taken: false,
            recorded: Vec::new(),
            missed: Vec::new(),
            committed: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &SessionRequest {
        &self.request
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_retest(&self) -> bool {
        self.retest
    }

    /// Questions in the current pass, across all its rounds.
    pub fn total_questions(&self) -> usize {
        self.words.len()
    }

    /// Ids of the words missed so far in the primary pass, first miss first.
    pub fn incorrect_ids(&self) -> Vec<InflectionId> {
        self.incorrect.iter().map(|w| w.id).collect()
    }

    /// Marks waiting for the next commit.
    pub fn pending_marks(&self) -> &[Mark] {
        &self.pending
    }

    pub fn current_question(&self) -> Result<Question, SessionError> {
        let word = self.current_word()?;
        Ok(Question {
            question: word.question.clone(),
            grammar_hint: word.grammar_hint.clone(),
            context_hint: word.context_hint.clone(),
            link: word.link.clone(),
            progress: Progress::at(self.index, self.questions_per_round, self.rounds),
            retest: self.retest,
        })
    }

    pub fn submit_answer(&mut self, text: &str) -> Result<AnswerOutcome, SessionError> {
        self.submit_answer_at(text, Utc::now())
    }

    /// Check `text` against the current word and advance, stamping any
    /// recorded mark with `timestamp`.
    pub fn submit_answer_at(
        &mut self,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SessionError> {
        let word = self.current_word()?.clone();
        let correct = word.accepts(text);

        if !self.retest {
            let mark = Mark::new(
                word.id,
                correct,
                self.request.call_language.direction_tag(),
                timestamp,
            );
            self.recorded.push(mark.clone());
            self.pending.push(mark);
            if !correct && !self.incorrect.iter().any(|w| w.id == word.id) {
                self.incorrect.push(word.clone());
            }
        }

        self.index += 1;
        if self.index == self.words.len() {
            self.phase = if self.retest || self.incorrect.is_empty() {
                SessionPhase::Finished
            } else {
                SessionPhase::RoundComplete
            };
            tracing::debug!(
                session = %self.id,
                retest = self.retest,
                incorrect = self.incorrect.len(),
                "pass complete"
            );
        }

        Ok(AnswerOutcome {
            correct,
            correct_answer: word.answer,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    pub fn has_pending_retest(&self) -> bool {
        self.phase == SessionPhase::RoundComplete
    }

    /// Run the incorrect words again over [`RETEST_ROUNDS`] shuffled rounds.
    pub fn start_retest<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SessionError> {
        if self.retest_taken {
            return Err(SessionError::RetestUnavailable("a retest was already taken"));
        }
        match self.phase {
            SessionPhase::RoundComplete => {}
            SessionPhase::AwaitingAnswer => {
                return Err(SessionError::RetestUnavailable(
                    "the primary pass is not over",
                ))
            }
            SessionPhase::Finished => {
                return Err(SessionError::RetestUnavailable(
                    "the session is finished",
                ))
            }
        }

        let missed = std::mem::take(&mut self.incorrect);
        self.words = expand_rounds(&missed, RETEST_ROUNDS, rng);
        self.questions_per_round = missed.len();
        self.rounds = RETEST_ROUNDS;
        self.missed = missed;
        self.index = 0;
        self.retest = true;
        self.retest_taken = true;
        self.phase = SessionPhase::AwaitingAnswer;
        tracing::info!(session = %self.id, words = self.missed.len(), "retest started");
        Ok(())
    }

    /// End the session, declining any retest. Pending marks are kept for commit.
    pub fn finish(&mut self) {
        if self.phase == SessionPhase::RoundComplete {
            self.missed = std::mem::take(&mut self.incorrect);
        }
        self.phase = SessionPhase::Finished;
    }

    /// End the session and drop every uncommitted mark.
    pub fn abandon(&mut self) {
        let dropped = self.pending.len();
        self.pending.clear();
        self.recorded.truncate(self.committed);
        self.phase = SessionPhase::Finished;
        tracing::info!(session = %self.id, dropped, "session abandoned");
    }

    /// Summary of the primary pass.
    pub fn report(&self) -> SessionReport {
        let missed = if self.missed.is_empty() {
            &self.incorrect
        } else {
            &self.missed
        };
        let correct = self.recorded.iter().filter(|m| m.is_correct()).count();
        SessionReport {
            session_id: self.id,
            started_at: self.started_at,
            generated_at: Utc::now(),
            call_language: self.request.call_language,
            n_words: self.request.n_words,
            n_rounds: self.request.n_rounds,
            answered: self.recorded.len(),
            correct,
            score_percent: score_percent(&self.recorded),
            missed: missed
                .iter()
                .map(|w| MissedWord {
                    id: w.id,
                    question: w.question.clone(),
                    answer: w.answer.clone(),
                })
                .collect(),
            retest_taken: self.retest_taken,
            committed_marks: self.committed,
            pending_marks: self.pending.len(),
        }
    }

    pub(crate) fn take_pending(&mut self) -> Vec<Mark> {
        std::mem::take(&mut self.pending)
    }

    /// Put marks back in front of anything recorded since they were taken.
    pub(crate) fn restore_pending(&mut self, mut marks: Vec<Mark>) {
        marks.append(&mut self.pending);
        self.pending = marks;
    }

    pub(crate) fn mark_committed(&mut self, count: usize) {
        self.committed += count;
    }

    fn current_word(&self) -> Result<&SessionWord, SessionError> {
        match self.phase {
            SessionPhase::AwaitingAnswer => self
                .words
                .get(self.index)
                .ok_or(SessionError::NoActiveQuestion("out of questions")),
            other => Err(SessionError::NoActiveQuestion(other.as_str())),
        }
    }
}
