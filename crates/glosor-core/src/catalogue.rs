//! The candidate catalogue for one filter combination.
//!
//! Storage hands back one row per (inflection, mark) pair. The catalogue folds
//! those rows into one entry per inflection carrying its full mark history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::model::{CandidateRow, GroupId, InflectionId, PartOfSpeech, WordCategory};

/// One testable surface form.
#[derive(Debug, Clone, PartialEq)]
pub struct Inflection {
    pub id: InflectionId,
    pub group_id: GroupId,
    pub source_text: String,
    pub target_text: String,
    pub part_of_speech: PartOfSpeech,
    pub word_category: WordCategory,
    pub grammar_hint: Option<String>,
    pub context_hint: Option<String>,
    pub link: Option<String>,
}

/// A historical mark as loaded from storage. Either field may be missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    pub value: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// An inflection and every mark recorded against it.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueEntry {
    pub inflection: Inflection,
    pub history: Vec<HistoryEntry>,
}

/// Candidate inflections keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    entries: BTreeMap<InflectionId, CatalogueEntry>,
}

impl Catalogue {
    /// Fold left-joined storage rows into a catalogue.
    ///
    /// Rows with neither a mark nor a timestamp are the join placeholder for
    /// an inflection without history and contribute no history entry.
    pub fn from_rows(rows: impl IntoIterator<Item = CandidateRow>) -> Self {
        let mut entries: BTreeMap<InflectionId, CatalogueEntry> = BTreeMap::new();
        for row in rows {
            let history = (row.mark.is_some() || row.mark_timestamp.is_some()).then_some(
                HistoryEntry {
                    value: row.mark,
                    timestamp: row.mark_timestamp,
                },
            );
            let entry = entries
                .entry(row.inflection_id)
                .or_insert_with(|| CatalogueEntry {
                    inflection: Inflection {
                        id: row.inflection_id,
                        group_id: row.group_id,
                        source_text: row.source_text,
                        target_text: row.target_text,
                        part_of_speech: row.part_of_speech,
                        word_category: row.word_category,
                        grammar_hint: row.grammar_hint,
                        context_hint: row.context_hint,
                        link: row.link,
                    },
                    history: Vec::new(),
                });
            entry.history.extend(history);
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct inflections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, id: InflectionId) -> Option<&CatalogueEntry> {
        self.entries.get(&id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogueEntry> {
        self.entries.values()
    }

    /// Entries grouped by word group, in ascending group id order.
    pub fn groups(&self) -> BTreeMap<GroupId, Vec<&CatalogueEntry>> {
        let mut groups: BTreeMap<GroupId, Vec<&CatalogueEntry>> = BTreeMap::new();
        for entry in self.entries.values() {
            groups.entry(entry.inflection.group_id).or_default().push(entry);
        }
        groups
    }
}

/// Builders for synthetic catalogues in unit tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::TimeZone;

    use super::*;

    pub fn row(id: InflectionId, group: GroupId, source: &str, target: &str) -> CandidateRow {
        CandidateRow {
            inflection_id: id,
            group_id: group,
            source_text: source.into(),
            target_text: target.into(),
            part_of_speech: PartOfSpeech::Noun,
            word_category: WordCategory::General,
            grammar_hint: None,
            context_hint: None,
            link: None,
            mark: None,
            mark_timestamp: None,
        }
    }

    pub fn marked(mut base: CandidateRow, mark: i64, secs: i64) -> CandidateRow {
        base.mark = Some(mark);
        base.mark_timestamp = Some(at(secs));
        base
    }

    pub fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    /// `n` single-inflection groups without history: ids and groups `1..=n`.
    pub fn plain(n: i64) -> Catalogue {
        Catalogue::from_rows((1..=n).map(|i| row(i, i, &format!("s{i}"), &format!("t{i}"))))
    }
}
