//! In-memory store for tests and throwaway sessions.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use glosor_core::error::StoreError;
use glosor_core::model::{
    CandidateRow, GrammarCategory, GroupId, InflectionId, Mark, PartOfSpeech, WordEntry,
    WordFilter,
};
use glosor_core::traits::{CatalogueSource, MarkSink};

use crate::error::lock_err;

#[derive(Default)]
struct State {
    words: BTreeMap<InflectionId, CandidateRow>,
    marks: Vec<Mark>,
    next_group: GroupId,
    failures_left: u32,
}

/// A store holding everything in memory.
///
/// Appends can be made to fail a set number of times to exercise commit retries.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fetch_calls: AtomicU32,
    append_calls: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a word group, numbering its inflections after the existing ones.
    pub fn insert_word_group(&self, entry: &WordEntry) -> Result<GroupId, StoreError> {
        if entry.forms.is_empty() {
            return Err(StoreError::Database(
                "a word group needs at least one form".into(),
            ));
        }
        let mut state = self.state.lock().map_err(lock_err)?;
        state.next_group += 1;
        let group_id = state.next_group;
        let mut next_id = state.words.keys().next_back().copied().unwrap_or(0);
        for (slot, pair) in &entry.forms {
            next_id += 1;
            let grammar_hint = (entry.part_of_speech == PartOfSpeech::Adjective
                && *slot != GrammarCategory::None)
                .then(|| slot.description().to_string());
            state.words.insert(
                next_id,
                CandidateRow {
                    inflection_id: next_id,
                    group_id,
                    source_text: pair.source.trim().to_string(),
                    target_text: pair.target.trim().to_string(),
                    part_of_speech: entry.part_of_speech,
                    word_category: entry.word_category,
                    grammar_hint,
                    context_hint: entry.context_hint.clone(),
                    link: entry.link.clone(),
                    mark: None,
                    mark_timestamp: None,
                },
            );
        }
        Ok(group_id)
    }

    /// Make the next `count` appends fail with a transient error.
    pub fn fail_next_appends(&self, count: u32) -> Result<(), StoreError> {
        self.state.lock().map_err(lock_err)?.failures_left = count;
        Ok(())
    }

    /// Every mark appended so far.
    pub fn marks(&self) -> Result<Vec<Mark>, StoreError> {
        Ok(self.state.lock().map_err(lock_err)?.marks.clone())
    }

    pub fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    pub fn append_calls(&self) -> u32 {
        self.append_calls.load(Ordering::Relaxed)
    }
}

impl CatalogueSource for MemoryStore {
    fn fetch_candidates(&self, filter: &WordFilter) -> Result<Vec<CandidateRow>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        let state = self.state.lock().map_err(lock_err)?;
        let mut rows = Vec::new();
        for word in state.words.values() {
            if !filter.matches(word.part_of_speech, word.word_category) {
                continue;
            }
            let mut marked = state
                .marks
                .iter()
                .filter(|m| m.inflection_id == word.inflection_id)
                .peekable();
            if marked.peek().is_none() {
                rows.push(word.clone());
                continue;
            }
            for mark in marked {
                let mut row = word.clone();
                row.mark = Some(i64::from(mark.mark));
                row.mark_timestamp = Some(mark.timestamp);
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

impl MarkSink for MemoryStore {
    fn append_marks(&self, marks: &[Mark]) -> Result<(), StoreError> {
        self.append_calls.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.lock().map_err(lock_err)?;
        if state.failures_left > 0 {
            state.failures_left -= 1;
            return Err(StoreError::Unavailable("injected append failure".into()));
        }
        state.marks.extend_from_slice(marks);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use glosor_core::model::{WordCategory, WordPair};

    fn adjective() -> WordEntry {
        WordEntry {
            part_of_speech: PartOfSpeech::Adjective,
            word_category: WordCategory::General,
            context_hint: Some("speed".into()),
            link: None,
            forms: [
                (GrammarCategory::Utrum, WordPair::new("snabb", "fast")),
                (GrammarCategory::Comparative, WordPair::new("snabbare", "faster")),
            ]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn rows_mirror_the_sqlite_join() {
        let store = MemoryStore::new();
        store.insert_word_group(&adjective()).unwrap();
        store
            .append_marks(&[Mark::new(1, true, 1, Utc::now()), Mark::new(1, false, 1, Utc::now())])
            .unwrap();

        let rows = store.fetch_candidates(&WordFilter::all()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.iter().filter(|r| r.inflection_id == 1).count(), 2);
        let fresh = rows.iter().find(|r| r.inflection_id == 2).unwrap();
        assert_eq!(fresh.mark, None);
        assert_eq!(fresh.grammar_hint.as_deref(), Some("comparative"));
        assert_eq!(store.fetch_calls(), 1);
    }

    #[test]
    fn injected_failures_are_transient_and_run_out() {
        let store = MemoryStore::new();
        store.fail_next_appends(2).unwrap();
        let marks = [Mark::new(1, true, 1, Utc::now())];
        for _ in 0..2 {
            let err = store.append_marks(&marks).unwrap_err();
            assert!(err.is_transient());
        }
        store.append_marks(&marks).unwrap();
        assert_eq!(store.marks().unwrap().len(), 1);
        assert_eq!(store.append_calls(), 3);
    }

    #[test]
    fn group_ids_increase() {
        let store = MemoryStore::new();
        assert_eq!(store.insert_word_group(&adjective()).unwrap(), 1);
        assert_eq!(store.insert_word_group(&adjective()).unwrap(), 2);
        let rows = store.fetch_candidates(&WordFilter::all()).unwrap();
        assert_eq!(rows.last().unwrap().inflection_id, 4);
    }

    #[test]
    fn group_without_forms_is_rejected() {
        let store = MemoryStore::new();
        let mut empty = adjective();
        empty.forms.clear();
        assert!(store.insert_word_group(&empty).is_err());
        assert!(store.fetch_candidates(&WordFilter::all()).unwrap().is_empty());
    }
}
