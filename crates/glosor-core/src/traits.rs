//! Storage collaborator traits.
//!
//! Implemented by `glosor-store` (SQLite and in-memory backends). Both take
//! `&self`; backends that need mutation guard their state internally.

use crate::error::StoreError;
use crate::model::{CandidateRow, Mark, WordFilter};

/// Source of candidate inflections and their mark history.
pub trait CatalogueSource {
    /// One row per (inflection, mark) pair for inflections matching `filter`.
    ///
    /// Inflections with no marks appear exactly once with `mark` and
    /// `mark_timestamp` unset.
    fn fetch_candidates(&self, filter: &WordFilter) -> Result<Vec<CandidateRow>, StoreError>;
}

/// Append-only mark storage.
pub trait MarkSink {
    /// Append every mark or none of them.
    fn append_marks(&self, marks: &[Mark]) -> Result<(), StoreError>;
}

/// A backend that can serve a whole session.
pub trait VocabularyStore: CatalogueSource + MarkSink {}

impl<T: CatalogueSource + MarkSink + ?Sized> VocabularyStore for T {}

impl<T: CatalogueSource + ?Sized> CatalogueSource for &T {
    fn fetch_candidates(&self, filter: &WordFilter) -> Result<Vec<CandidateRow>, StoreError> {
        (**self).fetch_candidates(filter)
    }
}

impl<T: MarkSink + ?Sized> MarkSink for &T {
    fn append_marks(&self, marks: &[Mark]) -> Result<(), StoreError> {
        (**self).append_marks(marks)
    }
}

impl<T: CatalogueSource + ?Sized> CatalogueSource for Box<T> {
    fn fetch_candidates(&self, filter: &WordFilter) -> Result<Vec<CandidateRow>, StoreError> {
        (**self).fetch_candidates(filter)
    }
}

impl<T: MarkSink + ?Sized> MarkSink for Box<T> {
    fn append_marks(&self, marks: &[Mark]) -> Result<(), StoreError> {
        (**self).append_marks(marks)
    }
}
