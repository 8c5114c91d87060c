//! SQLite-backed vocabulary store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use glosor_core::error::StoreError;
use glosor_core::model::{
    CallLanguage, CandidateRow, GrammarCategory, GroupId, Mark, PartOfSpeech, WordCategory,
    WordEntry, WordFilter,
};
use glosor_core::traits::{CatalogueSource, MarkSink};

use crate::error::{lock_err, RowError, SqliteResultExt};

const SCHEMA: &str = include_str!("schema.sql");

/// Bumped whenever `schema.sql` changes incompatibly.
pub const SCHEMA_VERSION: i64 = 1;

/// What a prune pass removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PruneSummary {
    pub removed_marks: usize,
    /// Distinct deleted words the removed marks pointed at.
    pub removed_words: usize,
}

/// Outcome of [`SqliteStore::insert_word_group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedGroup {
    /// `None` when every form was already stored.
    pub group_id: Option<GroupId>,
    pub inserted: usize,
    /// Forms skipped as duplicates of stored pairs.
    pub skipped: usize,
}

/// A vocabulary database in one SQLite file.
pub struct SqliteStore {
    connection: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let connection = Connection::open(path).store_err()?;
        connection
            .execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;",
            )
            .store_err()?;
        let store = Self {
            connection: Mutex::new(connection),
            path: Some(path.to_path_buf()),
        };
        store.initialize()?;
        tracing::debug!("opened vocabulary database at {}", path.display());
        Ok(store)
    }

    /// A private database that disappears with the store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory().store_err()?;
        let store = Self {
            connection: Mutex::new(connection),
            path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Backing file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock().map_err(lock_err)
    }

    fn initialize(&self) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .store_err()?;
        if version > SCHEMA_VERSION {
            return Err(StoreError::Database(format!(
                "database schema version {version} is newer than supported version {SCHEMA_VERSION}"
            )));
        }

        let tx = conn.transaction().store_err()?;
        tx.execute_batch(SCHEMA).store_err()?;
        for pos in PartOfSpeech::ALL {
            tx.execute(
                "INSERT OR IGNORE INTO part_of_speech (id, name) VALUES (?1, ?2)",
                params![pos.id(), pos.as_str()],
            )
            .store_err()?;
        }
        for category in WordCategory::ALL {
            tx.execute(
                "INSERT OR IGNORE INTO word_category (id, name) VALUES (?1, ?2)",
                params![category.id(), category.as_str()],
            )
            .store_err()?;
        }
        for slot in GrammarCategory::ALL {
            tx.execute(
                "INSERT OR IGNORE INTO grammar_category (id, name, description) VALUES (?1, ?2, ?3)",
                params![slot.id(), slot.as_str(), slot.description()],
            )
            .store_err()?;
        }
        for language in [CallLanguage::Source, CallLanguage::Target] {
            let name = match language {
                CallLanguage::Source => "source to target",
                CallLanguage::Target => "target to source",
            };
            tx.execute(
                "INSERT OR IGNORE INTO translation_direction (id, name) VALUES (?1, ?2)",
                params![language.direction_tag(), name],
            )
            .store_err()?;
        }
        tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
            .store_err()?;
        tx.commit().store_err()?;
        Ok(())
    }

    /// Insert the forms of a word group in one transaction.
    ///
    /// Forms whose (source, target, slot) triple is already stored are
    /// skipped. When any form was skipped the group's context hint and link
    /// are not stored either. No group id is allocated if every form was a
    /// duplicate.
    pub fn insert_word_group(&self, entry: &WordEntry) -> Result<InsertedGroup, StoreError> {
        if entry.forms.is_empty() {
            return Err(StoreError::Database(
                "a word group needs at least one form".into(),
            ));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction().store_err()?;

        let group_id: GroupId = tx
            .query_row("SELECT COALESCE(MAX(group_id), 0) + 1 FROM word", [], |row| {
                row.get(0)
            })
            .store_err()?;

        let mut inserted = 0;
        let mut skipped = 0;
        {
            let mut exists = tx
                .prepare(
                    "SELECT EXISTS (SELECT 1 FROM word
                     WHERE source_text = ?1 AND target_text = ?2 AND grammar_category_id = ?3)",
                )
                .store_err()?;
            let mut insert = tx
                .prepare(
                    "INSERT INTO word (source_text, target_text, word_category_id,
                                       part_of_speech_id, group_id, grammar_category_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .store_err()?;
            for (slot, pair) in &entry.forms {
                let (source, target) = (pair.source.trim(), pair.target.trim());
                let duplicate: bool = exists
                    .query_row(params![source, target, slot.id()], |row| row.get(0))
                    .store_err()?;
                if duplicate {
                    tracing::info!(source, target, "word pair already in database");
                    skipped += 1;
                    continue;
                }
                insert
                    .execute(params![
                        source,
                        target,
                        entry.word_category.id(),
                        entry.part_of_speech.id(),
                        group_id,
                        slot.id(),
                    ])
                    .store_err()?;
                inserted += 1;
            }
        }

        if inserted == 0 {
            return Ok(InsertedGroup {
                group_id: None,
                inserted,
                skipped,
            });
        }

        if skipped == 0 {
            if let Some(hint) = &entry.context_hint {
                tx.execute(
                    "INSERT INTO context_hint (group_id, hint) VALUES (?1, ?2)",
                    params![group_id, hint],
                )
                .store_err()?;
            }
            if let Some(url) = &entry.link {
                tx.execute(
                    "INSERT INTO link (group_id, url) VALUES (?1, ?2)",
                    params![group_id, url],
                )
                .store_err()?;
            }
        }

        tx.commit().store_err()?;
        Ok(InsertedGroup {
            group_id: Some(group_id),
            inserted,
            skipped,
        })
    }

    /// Delete a word group with its hint and link. Its marks stay until pruned.
    ///
    /// Returns the number of inflections removed.
    pub fn delete_word_group(&self, group_id: GroupId) -> Result<usize, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().store_err()?;
        let removed = tx
            .execute("DELETE FROM word WHERE group_id = ?1", params![group_id])
            .store_err()?;
        if removed == 0 {
            return Err(StoreError::NotFound(format!("word group {group_id}")));
        }
        tx.execute("DELETE FROM context_hint WHERE group_id = ?1", params![group_id])
            .store_err()?;
        tx.execute("DELETE FROM link WHERE group_id = ?1", params![group_id])
            .store_err()?;
        tx.commit().store_err()?;
        Ok(removed)
    }

    /// Delete marks whose word no longer exists.
    pub fn prune_orphan_marks(&self) -> Result<PruneSummary, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().store_err()?;
        let removed_words: i64 = tx
            .query_row(
                "SELECT COUNT(DISTINCT word_id) FROM mark
                 WHERE word_id NOT IN (SELECT id FROM word)",
                [],
                |row| row.get(0),
            )
            .store_err()?;
        let removed_marks = tx
            .execute(
                "DELETE FROM mark WHERE word_id NOT IN (SELECT id FROM word)",
                [],
            )
            .store_err()?;
        tx.commit().store_err()?;

        let summary = PruneSummary {
            removed_marks,
            removed_words: removed_words as usize,
        };
        tracing::info!(
            removed_marks = summary.removed_marks,
            removed_words = summary.removed_words,
            "pruned orphan marks"
        );
        Ok(summary)
    }

    /// Number of inflections.
    pub fn word_count(&self) -> Result<usize, StoreError> {
        self.count("SELECT COUNT(*) FROM word")
    }

    pub fn group_count(&self) -> Result<usize, StoreError> {
        self.count("SELECT COUNT(DISTINCT group_id) FROM word")
    }

    pub fn mark_count(&self) -> Result<usize, StoreError> {
        self.count("SELECT COUNT(*) FROM mark")
    }

    fn count(&self, sql: &str) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row(sql, [], |row| row.get(0)).store_err()?;
        Ok(n as usize)
    }

    /// Group id of an inflection.
    pub fn group_of(&self, word_id: i64) -> Result<Option<GroupId>, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT group_id FROM word WHERE id = ?1",
            params![word_id],
            |row| row.get(0),
        )
        .optional()
        .store_err()
    }
}

/// Raw columns of one candidate row, before enum ids are checked.
struct RawCandidate {
    inflection_id: i64,
    group_id: i64,
    source_text: String,
    target_text: String,
    part_of_speech: i64,
    word_category: i64,
    grammar_hint: Option<String>,
    context_hint: Option<String>,
    link: Option<String>,
    mark: Option<i64>,
    timestamp_ms: Option<i64>,
}

impl RawCandidate {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            inflection_id: row.get(0)?,
            group_id: row.get(1)?,
            source_text: row.get(2)?,
            target_text: row.get(3)?,
            part_of_speech: row.get(4)?,
            word_category: row.get(5)?,
            grammar_hint: row.get(6)?,
            context_hint: row.get(7)?,
            link: row.get(8)?,
            mark: row.get(9)?,
            timestamp_ms: row.get(10)?,
        })
    }

    fn into_candidate(self) -> Result<CandidateRow, RowError> {
        let part_of_speech = PartOfSpeech::from_id(self.part_of_speech)
            .ok_or(RowError::PartOfSpeech(self.part_of_speech))?;
        let word_category = WordCategory::from_id(self.word_category)
            .ok_or(RowError::WordCategory(self.word_category))?;
        let mark_timestamp = self
            .timestamp_ms
            .map(|ms| DateTime::<Utc>::from_timestamp_millis(ms).ok_or(RowError::Timestamp(ms)))
            .transpose()?;
        Ok(CandidateRow {
            inflection_id: self.inflection_id,
            group_id: self.group_id,
            source_text: self.source_text,
            target_text: self.target_text,
            part_of_speech,
            word_category,
            grammar_hint: self.grammar_hint,
            context_hint: self.context_hint,
            link: self.link,
            mark: self.mark,
            mark_timestamp,
        })
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl CatalogueSource for SqliteStore {
    fn fetch_candidates(&self, filter: &WordFilter) -> Result<Vec<CandidateRow>, StoreError> {
        if filter.parts_of_speech.is_empty() || filter.word_categories.is_empty() {
            return Ok(Vec::new());
        }

        // Only adjectives get a grammar hint; other inflections show in the question itself.
        let sql = format!(
            "SELECT w.id, w.group_id, w.source_text, w.target_text,
                    w.part_of_speech_id, w.word_category_id,
                    CASE WHEN w.part_of_speech_id = ? THEN NULLIF(g.description, '') END,
                    h.hint, l.url, m.mark, m.timestamp_ms
             FROM word AS w
             JOIN grammar_category AS g ON g.id = w.grammar_category_id
             LEFT JOIN mark AS m ON m.word_id = w.id
             LEFT JOIN context_hint AS h ON h.group_id = w.group_id
             LEFT JOIN link AS l ON l.group_id = w.group_id
             WHERE w.part_of_speech_id IN ({})
               AND w.word_category_id IN ({})
             ORDER BY w.id, m.id",
            placeholders(filter.parts_of_speech.len()),
            placeholders(filter.word_categories.len()),
        );
        let args: Vec<i64> = std::iter::once(PartOfSpeech::Adjective.id())
            .chain(filter.parts_of_speech.iter().map(|p| p.id()))
            .chain(filter.word_categories.iter().map(|c| c.id()))
            .collect();

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql).store_err()?;
        let raw = stmt
            .query_map(params_from_iter(args), RawCandidate::from_row)
            .store_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .store_err()?;

        let rows = raw
            .into_iter()
            .map(|r| r.into_candidate().map_err(StoreError::from))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(rows = rows.len(), "fetched candidate rows");
        Ok(rows)
    }
}

impl MarkSink for SqliteStore {
    fn append_marks(&self, marks: &[Mark]) -> Result<(), StoreError> {
        if marks.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction().store_err()?;
        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO mark (word_id, mark, translation_direction_id, timestamp_ms)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .store_err()?;
            for mark in marks {
                insert
                    .execute(params![
                        mark.inflection_id,
                        mark.mark,
                        mark.direction,
                        mark.timestamp.timestamp_millis(),
                    ])
                    .store_err()?;
            }
        }
        tx.commit().store_err()?;
        Ok(())
    }
}
