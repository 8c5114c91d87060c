//! Resolving selected inflections into questions and laying out rounds.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalogue::{Catalogue, Inflection};
use crate::error::SessionError;
use crate::model::{CallLanguage, InflectionId};
use crate::text::{accepted_answers, normalize_answer, variants};

/// A fully resolved question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWord {
    pub id: InflectionId,
    /// First variant of the question-side text.
    pub question: String,
    /// Every answer variant, joined by `" / "` for display.
    pub answer: String,
    /// Normalized answers accepted as correct.
    pub valid_answers: Vec<String>,
    pub grammar_hint: Option<String>,
    pub context_hint: Option<String>,
    pub link: Option<String>,
}

impl SessionWord {
    pub fn resolve(inflection: &Inflection, call_language: CallLanguage) -> Self {
        let (question_text, answer_text) = match call_language {
            CallLanguage::Source => (&inflection.source_text, &inflection.target_text),
            CallLanguage::Target => (&inflection.target_text, &inflection.source_text),
        };
        Self {
            id: inflection.id,
            question: variants(question_text).next().unwrap_or_default().to_string(),
            answer: variants(answer_text).collect::<Vec<_>>().join(" / "),
            valid_answers: accepted_answers(answer_text),
            grammar_hint: inflection.grammar_hint.clone(),
            context_hint: inflection.context_hint.clone(),
            link: inflection.link.clone(),
        }
    }

    /// Whether `submitted` matches any accepted variant after normalization.
    pub fn accepts(&self, submitted: &str) -> bool {
        let normalized = normalize_answer(submitted);
        self.valid_answers.iter().any(|a| *a == normalized)
    }
}

/// Resolve selected ids against the catalogue, preserving order.
pub fn resolve_words(
    word_ids: &[InflectionId],
    catalogue: &Catalogue,
    call_language: CallLanguage,
) -> Result<Vec<SessionWord>, SessionError> {
    word_ids
        .iter()
        .map(|&id| {
            catalogue
                .get(id)
                .map(|entry| SessionWord::resolve(&entry.inflection, call_language))
                .ok_or_else(|| {
                    SessionError::InvalidRequest(format!("word {id} is not in the catalogue"))
                })
        })
        .collect()
}

/// Repeat `words` for `n_rounds` rounds, shuffling before each round.
pub fn expand_rounds<R: Rng + ?Sized>(
    words: &[SessionWord],
    n_rounds: usize,
    rng: &mut R,
) -> Vec<SessionWord> {
    let mut round = words.to_vec();
    let mut expanded = Vec::with_capacity(words.len() * n_rounds);
    for _ in 0..n_rounds {
        round.shuffle(rng);
        expanded.extend_from_slice(&round);
    }
    expanded
}

/// Resolve `word_ids` and lay them out over `n_rounds` shuffled rounds.
pub fn expand<R: Rng + ?Sized>(
    word_ids: &[InflectionId],
    catalogue: &Catalogue,
    n_rounds: usize,
    call_language: CallLanguage,
    rng: &mut R,
) -> Result<Vec<SessionWord>, SessionError> {
    let words = resolve_words(word_ids, catalogue, call_language)?;
    Ok(expand_rounds(&words, n_rounds, rng))
}
