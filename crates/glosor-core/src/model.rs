//! Core data model types for glosor.
//!
//! Word classification enums, the word-group record used for import, the
//! storage row shape, and the marks written back after a session.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a single inflected form.
pub type InflectionId = i64;

/// Identifier of the word group an inflection belongs to.
pub type GroupId = i64;

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

/// Parts of speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Phrase,
    Preposition,
    Conjunction,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 7] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
        PartOfSpeech::Phrase,
        PartOfSpeech::Preposition,
        PartOfSpeech::Conjunction,
    ];

    /// Stable storage id.
    pub fn id(self) -> i64 {
        match self {
            PartOfSpeech::Noun => 1,
            PartOfSpeech::Verb => 2,
            PartOfSpeech::Adjective => 3,
            PartOfSpeech::Adverb => 4,
            PartOfSpeech::Phrase => 5,
            PartOfSpeech::Preposition => 6,
            PartOfSpeech::Conjunction => 7,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adjective",
            PartOfSpeech::Adverb => "adverb",
            PartOfSpeech::Phrase => "phrase",
            PartOfSpeech::Preposition => "preposition",
            PartOfSpeech::Conjunction => "conjunction",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartOfSpeech {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "noun" => Ok(PartOfSpeech::Noun),
            "verb" => Ok(PartOfSpeech::Verb),
            "adjective" | "adj" => Ok(PartOfSpeech::Adjective),
            "adverb" | "adv" => Ok(PartOfSpeech::Adverb),
            "phrase" => Ok(PartOfSpeech::Phrase),
            "preposition" | "prep" => Ok(PartOfSpeech::Preposition),
            "conjunction" | "conj" => Ok(PartOfSpeech::Conjunction),
            other => Err(format!("unknown part of speech: {other}")),
        }
    }
}

/// Thematic word categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WordCategory {
    General,
    Food,
    Sport,
    Business,
    Geography,
    Body,
    WordOrder,
    Time,
    ParticleVerbs,
    Clothes,
    Computers,
    Science,
    Animals,
}

impl WordCategory {
    pub const ALL: [WordCategory; 13] = [
        WordCategory::General,
        WordCategory::Food,
        WordCategory::Sport,
        WordCategory::Business,
        WordCategory::Geography,
        WordCategory::Body,
        WordCategory::WordOrder,
        WordCategory::Time,
        WordCategory::ParticleVerbs,
        WordCategory::Clothes,
        WordCategory::Computers,
        WordCategory::Science,
        WordCategory::Animals,
    ];

    /// Stable storage id.
    pub fn id(self) -> i64 {
        match self {
            WordCategory::General => 1,
            WordCategory::Food => 2,
            WordCategory::Sport => 3,
            WordCategory::Business => 4,
            WordCategory::Geography => 5,
            WordCategory::Body => 6,
            WordCategory::WordOrder => 7,
            WordCategory::Time => 8,
            WordCategory::ParticleVerbs => 9,
            WordCategory::Clothes => 10,
            WordCategory::Computers => 11,
            WordCategory::Science => 12,
            WordCategory::Animals => 13,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WordCategory::General => "general",
            WordCategory::Food => "food",
            WordCategory::Sport => "sport",
            WordCategory::Business => "business",
            WordCategory::Geography => "geography",
            WordCategory::Body => "body",
            WordCategory::WordOrder => "word-order",
            WordCategory::Time => "time",
            WordCategory::ParticleVerbs => "particle-verbs",
            WordCategory::Clothes => "clothes",
            WordCategory::Computers => "computers",
            WordCategory::Science => "science",
            WordCategory::Animals => "animals",
        }
    }
}

impl fmt::Display for WordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WordCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown word category: {}", s.trim()))
    }
}

/// Grammar slot an inflection fills within its word group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrammarCategory {
    None,
    IndefiniteSingular,
    DefiniteSingular,
    IndefinitePlural,
    DefinitePlural,
    Utrum,
    Neutrum,
    AdjectivePlural,
    Preposition,
    Infinitive,
    Present,
    Past,
    PresentPerfect,
    Imperative,
    Comparative,
    Superlative,
}

impl GrammarCategory {
    pub const ALL: [GrammarCategory; 16] = [
        GrammarCategory::None,
        GrammarCategory::IndefiniteSingular,
        GrammarCategory::DefiniteSingular,
        GrammarCategory::IndefinitePlural,
        GrammarCategory::DefinitePlural,
        GrammarCategory::Utrum,
        GrammarCategory::Neutrum,
        GrammarCategory::AdjectivePlural,
        GrammarCategory::Preposition,
        GrammarCategory::Infinitive,
        GrammarCategory::Present,
        GrammarCategory::Past,
        GrammarCategory::PresentPerfect,
        GrammarCategory::Imperative,
        GrammarCategory::Comparative,
        GrammarCategory::Superlative,
    ];

    /// Stable storage id.
    pub fn id(self) -> i64 {
        match self {
            GrammarCategory::None => 0,
            GrammarCategory::IndefiniteSingular => 1,
            GrammarCategory::DefiniteSingular => 2,
            GrammarCategory::IndefinitePlural => 3,
            GrammarCategory::DefinitePlural => 4,
            GrammarCategory::Utrum => 5,
            GrammarCategory::Neutrum => 6,
            GrammarCategory::AdjectivePlural => 7,
            GrammarCategory::Preposition => 8,
            GrammarCategory::Infinitive => 9,
            GrammarCategory::Present => 10,
            GrammarCategory::Past => 11,
            GrammarCategory::PresentPerfect => 12,
            GrammarCategory::Imperative => 13,
            GrammarCategory::Comparative => 14,
            GrammarCategory::Superlative => 15,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.id() == id)
    }

    /// The part of speech this slot belongs to. `None` slots fit any word.
    pub fn part_of_speech(self) -> Option<PartOfSpeech> {
        match self {
            GrammarCategory::None => None,
            GrammarCategory::IndefiniteSingular
            | GrammarCategory::DefiniteSingular
            | GrammarCategory::IndefinitePlural
            | GrammarCategory::DefinitePlural => Some(PartOfSpeech::Noun),
            GrammarCategory::Utrum
            | GrammarCategory::Neutrum
            | GrammarCategory::AdjectivePlural
            | GrammarCategory::Comparative
            | GrammarCategory::Superlative => Some(PartOfSpeech::Adjective),
            GrammarCategory::Preposition => Some(PartOfSpeech::Preposition),
            GrammarCategory::Infinitive
            | GrammarCategory::Present
            | GrammarCategory::Past
            | GrammarCategory::PresentPerfect
            | GrammarCategory::Imperative => Some(PartOfSpeech::Verb),
        }
    }

    /// Whether an inflection in this slot may belong to a word of `pos`.
    pub fn fits(self, pos: PartOfSpeech) -> bool {
        self.part_of_speech().map_or(true, |p| p == pos)
    }

    /// Kebab-case tag used in word lists.
    pub fn as_str(self) -> &'static str {
        match self {
            GrammarCategory::None => "none",
            GrammarCategory::IndefiniteSingular => "indefinite-singular",
            GrammarCategory::DefiniteSingular => "definite-singular",
            GrammarCategory::IndefinitePlural => "indefinite-plural",
            GrammarCategory::DefinitePlural => "definite-plural",
            GrammarCategory::Utrum => "utrum",
            GrammarCategory::Neutrum => "neutrum",
            GrammarCategory::AdjectivePlural => "adjective-plural",
            GrammarCategory::Preposition => "preposition",
            GrammarCategory::Infinitive => "infinitive",
            GrammarCategory::Present => "present",
            GrammarCategory::Past => "past",
            GrammarCategory::PresentPerfect => "present-perfect",
            GrammarCategory::Imperative => "imperative",
            GrammarCategory::Comparative => "comparative",
            GrammarCategory::Superlative => "superlative",
        }
    }

    /// Human-readable description, used as the grammar hint.
    pub fn description(self) -> &'static str {
        match self {
            GrammarCategory::None => "",
            GrammarCategory::IndefiniteSingular => "indefinite singular",
            GrammarCategory::DefiniteSingular => "definite singular",
            GrammarCategory::IndefinitePlural => "indefinite plural",
            GrammarCategory::DefinitePlural => "definite plural",
            GrammarCategory::Utrum => "utrum",
            GrammarCategory::Neutrum => "neuter",
            GrammarCategory::AdjectivePlural => "plural",
            GrammarCategory::Preposition => "preposition",
            GrammarCategory::Infinitive => "infinitive",
            GrammarCategory::Present => "present",
            GrammarCategory::Past => "past",
            GrammarCategory::PresentPerfect => "present perfect",
            GrammarCategory::Imperative => "imperative",
            GrammarCategory::Comparative => "comparative",
            GrammarCategory::Superlative => "superlative",
        }
    }
}

impl fmt::Display for GrammarCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrammarCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| format!("unknown grammar slot: {}", s.trim()))
    }
}

/// Which side of a word pair is shown as the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallLanguage {
    #[default]
    Source,
    Target,
}

impl CallLanguage {
    /// Translation direction tag stored with every mark.
    ///
    /// 1 when the answer is given in the target language, 2 when it is given
    /// in the source language.
    pub fn direction_tag(self) -> i64 {
        match self {
            CallLanguage::Source => 1,
            CallLanguage::Target => 2,
        }
    }
}

impl fmt::Display for CallLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallLanguage::Source => write!(f, "source"),
            CallLanguage::Target => write!(f, "target"),
        }
    }
}

impl FromStr for CallLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "source" | "src" => Ok(CallLanguage::Source),
            "target" | "tgt" => Ok(CallLanguage::Target),
            other => Err(format!("unknown call language: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// The part-of-speech and category tags a session draws from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WordFilter {
    pub parts_of_speech: BTreeSet<PartOfSpeech>,
    pub word_categories: BTreeSet<WordCategory>,
}

impl WordFilter {
    pub fn new(
        parts_of_speech: impl IntoIterator<Item = PartOfSpeech>,
        word_categories: impl IntoIterator<Item = WordCategory>,
    ) -> Self {
        Self {
            parts_of_speech: parts_of_speech.into_iter().collect(),
            word_categories: word_categories.into_iter().collect(),
        }
    }

    /// A filter admitting every tag.
    pub fn all() -> Self {
        Self::new(PartOfSpeech::ALL, WordCategory::ALL)
    }

    pub fn matches(&self, pos: PartOfSpeech, category: WordCategory) -> bool {
        self.parts_of_speech.contains(&pos) && self.word_categories.contains(&category)
    }
}

// ---------------------------------------------------------------------------
// Word groups (import shape)
// ---------------------------------------------------------------------------

/// A source/target text pair. Either side may hold `/`-separated variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    pub source: String,
    pub target: String,
}

impl WordPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A word group as a tagged record: every inflected form keyed by its grammar slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub part_of_speech: PartOfSpeech,
    pub word_category: WordCategory,
    #[serde(default)]
    pub context_hint: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    pub forms: BTreeMap<GrammarCategory, WordPair>,
}

impl WordEntry {
    /// Slots that do not belong to this entry's part of speech.
    pub fn misplaced_slots(&self) -> Vec<GrammarCategory> {
        self.forms
            .keys()
            .copied()
            .filter(|slot| !slot.fits(self.part_of_speech))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Storage rows and marks
// ---------------------------------------------------------------------------

/// One (inflection, historical mark) pair as returned by the catalogue source.
///
/// Inflections without history appear once with `mark` and `mark_timestamp` unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRow {
    pub inflection_id: InflectionId,
    pub group_id: GroupId,
    pub source_text: String,
    pub target_text: String,
    pub part_of_speech: PartOfSpeech,
    pub word_category: WordCategory,
    #[serde(default)]
    pub grammar_hint: Option<String>,
    #[serde(default)]
    pub context_hint: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub mark: Option<i64>,
    #[serde(default)]
    pub mark_timestamp: Option<DateTime<Utc>>,
}

/// A correctness record produced by a session, waiting to be appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub inflection_id: InflectionId,
    /// 1 for a correct answer, 0 otherwise.
    pub mark: u8,
    /// See [`CallLanguage::direction_tag`].
    pub direction: i64,
    pub timestamp: DateTime<Utc>,
}

impl Mark {
    pub fn new(
        inflection_id: InflectionId,
        correct: bool,
        direction: i64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            inflection_id,
            mark: u8::from(correct),
            direction,
            timestamp,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.mark == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_of_speech_display_and_parse() {
        assert_eq!(PartOfSpeech::Adjective.to_string(), "adjective");
        assert_eq!("Verb".parse::<PartOfSpeech>().unwrap(), PartOfSpeech::Verb);
        assert_eq!("adj".parse::<PartOfSpeech>().unwrap(), PartOfSpeech::Adjective);
        assert!("gerund".parse::<PartOfSpeech>().is_err());
    }

    #[test]
    fn word_category_accepts_separators() {
        assert_eq!(
            "particle_verbs".parse::<WordCategory>().unwrap(),
            WordCategory::ParticleVerbs
        );
        assert_eq!(
            "Word Order".parse::<WordCategory>().unwrap(),
            WordCategory::WordOrder
        );
        assert!("weather".parse::<WordCategory>().is_err());
    }

    #[test]
    fn storage_ids_roundtrip() {
        for pos in PartOfSpeech::ALL {
            assert_eq!(PartOfSpeech::from_id(pos.id()), Some(pos));
        }
        for cat in WordCategory::ALL {
            assert_eq!(WordCategory::from_id(cat.id()), Some(cat));
        }
        for slot in GrammarCategory::ALL {
            assert_eq!(GrammarCategory::from_id(slot.id()), Some(slot));
        }
        assert_eq!(PartOfSpeech::from_id(99), None);
    }

    #[test]
    fn grammar_slots_belong_to_parts_of_speech() {
        assert!(GrammarCategory::Past.fits(PartOfSpeech::Verb));
        assert!(!GrammarCategory::Past.fits(PartOfSpeech::Noun));
        assert!(GrammarCategory::None.fits(PartOfSpeech::Phrase));
    }

    #[test]
    fn grammar_slot_tags_parse() {
        assert_eq!(
            "present_perfect".parse::<GrammarCategory>().unwrap(),
            GrammarCategory::PresentPerfect
        );
        for slot in GrammarCategory::ALL {
            assert_eq!(slot.to_string().parse::<GrammarCategory>().unwrap(), slot);
        }
        assert!("gerund".parse::<GrammarCategory>().is_err());
    }

    #[test]
    fn misplaced_slots_detected() {
        let mut forms = BTreeMap::new();
        forms.insert(GrammarCategory::Infinitive, WordPair::new("springa", "run"));
        forms.insert(GrammarCategory::Utrum, WordPair::new("snabb", "fast"));
        let entry = WordEntry {
            part_of_speech: PartOfSpeech::Verb,
            word_category: WordCategory::General,
            context_hint: None,
            link: None,
            forms,
        };
        assert_eq!(entry.misplaced_slots(), vec![GrammarCategory::Utrum]);
    }

    #[test]
    fn direction_tags() {
        assert_eq!(CallLanguage::Source.direction_tag(), 1);
        assert_eq!(CallLanguage::Target.direction_tag(), 2);
        assert_eq!("tgt".parse::<CallLanguage>().unwrap(), CallLanguage::Target);
    }

    #[test]
    fn filter_matches_both_tags() {
        let filter = WordFilter::new([PartOfSpeech::Noun], [WordCategory::Food]);
        assert!(filter.matches(PartOfSpeech::Noun, WordCategory::Food));
        assert!(!filter.matches(PartOfSpeech::Noun, WordCategory::Sport));
        assert!(!filter.matches(PartOfSpeech::Verb, WordCategory::Food));
    }

    #[test]
    fn mark_from_bool() {
        let mark = Mark::new(4, true, 1, Utc::now());
        assert_eq!(mark.mark, 1);
        assert!(mark.is_correct());
        assert_eq!(Mark::new(4, false, 1, Utc::now()).mark, 0);
    }
}
