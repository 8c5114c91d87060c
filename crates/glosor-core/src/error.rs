//! Session and storage error types.
//!
//! `StoreError` lives in `glosor-core` rather than in the store crate so the
//! engine can classify storage failures (retryable commit vs. broken catalogue)
//! without string matching.

use thiserror::Error;

use crate::model::WordFilter;

/// Errors reported by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected a query or statement.
    #[error("database error: {0}")]
    Database(String),

    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The connection lock was poisoned by a panicking holder.
    #[error("failed to acquire store lock: {0}")]
    Lock(String),

    /// The store is temporarily unable to serve requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A referenced row does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl StoreError {
    /// Returns `true` if repeating the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_) | StoreError::Lock(_) | StoreError::Io(_)
        )
    }
}

/// Errors surfaced to the presentation layer by the session engine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The filter combination yields no candidate inflections.
    #[error("no eligible words for parts of speech [{parts_of_speech}] and categories [{word_categories}]")]
    NoEligibleWords {
        parts_of_speech: String,
        word_categories: String,
    },

    /// The caller broke the request contract (zero words, zero rounds, empty filters, ...).
    #[error("invalid session request: {0}")]
    InvalidRequest(String),

    /// Loading the catalogue failed.
    #[error("failed to load vocabulary: {0}")]
    Store(#[from] StoreError),

    /// Flushing pending marks failed. The marks are still buffered.
    #[error("failed to commit {pending} mark(s): {source}")]
    Commit {
        pending: usize,
        #[source]
        source: StoreError,
    },

    /// A retest was requested when none is available.
    #[error("no retest available: {0}")]
    RetestUnavailable(&'static str),

    /// An answer or question was requested outside of `AwaitingAnswer`.
    #[error("no active question, the session is {0}")]
    NoActiveQuestion(&'static str),
}

impl SessionError {
    pub(crate) fn no_eligible_words(filter: &WordFilter) -> Self {
        SessionError::NoEligibleWords {
            parts_of_speech: join_tags(filter.parts_of_speech.iter()),
            word_categories: join_tags(filter.word_categories.iter()),
        }
    }

    /// Returns `true` for the one condition a caller may retry as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::Commit { .. })
    }
}

fn join_tags<T: std::fmt::Display>(tags: impl Iterator<Item = T>) -> String {
    tags.map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PartOfSpeech, WordCategory};

    #[test]
    fn only_commit_failures_are_retryable() {
        let commit = SessionError::Commit {
            pending: 3,
            source: StoreError::Unavailable("disk full".into()),
        };
        assert!(commit.is_retryable());
        assert!(!SessionError::InvalidRequest("zero rounds".into()).is_retryable());
        assert!(!SessionError::Store(StoreError::Database("boom".into())).is_retryable());
    }

    #[test]
    fn no_eligible_words_lists_filters() {
        let filter = WordFilter::new([PartOfSpeech::Verb], [WordCategory::Food]);
        let msg = SessionError::no_eligible_words(&filter).to_string();
        assert!(msg.contains("verb"), "got: {msg}");
        assert!(msg.contains("food"), "got: {msg}");
    }

    #[test]
    fn transient_store_errors() {
        assert!(StoreError::Unavailable("busy".into()).is_transient());
        assert!(!StoreError::NotFound("word 7".into()).is_transient());
    }
}
