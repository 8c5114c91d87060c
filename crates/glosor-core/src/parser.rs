//! TOML word-list parser.
//!
//! Loads word lists from TOML files and directories, and validates them.
//!
//! ```toml
//! [word_list]
//! name = "Animals"
//! default_category = "animals"
//!
//! [[words]]
//! part_of_speech = "noun"
//! source = "hund"
//! target = "dog"
//!
//! [[words]]
//! part_of_speech = "adjective"
//! category = "general"
//! [words.forms]
//! utrum = { source = "snabb", target = "fast" }
//! neutrum = { source = "snabbt", target = "fast" }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{GrammarCategory, PartOfSpeech, WordCategory, WordEntry, WordPair};
use crate::text::variants;

/// A parsed word list.
#[derive(Debug, Clone, PartialEq)]
pub struct WordList {
    pub name: String,
    pub description: String,
    pub words: Vec<WordEntry>,
}

#[derive(Debug, Deserialize)]
struct TomlWordFile {
    word_list: TomlWordListHeader,
    #[serde(default)]
    words: Vec<TomlWord>,
}

#[derive(Debug, Deserialize)]
struct TomlWordListHeader {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_category_str")]
    default_category: String,
}

fn default_category_str() -> String {
    "general".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlWord {
    part_of_speech: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    link: Option<String>,
    /// Shorthand for a single form without a grammar slot.
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    forms: BTreeMap<String, TomlPair>,
}

#[derive(Debug, Deserialize)]
struct TomlPair {
    source: String,
    target: String,
}

/// Parse a single TOML file into a `WordList`.
pub fn parse_word_list(path: &Path) -> Result<WordList> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read word list: {}", path.display()))?;

    parse_word_list_str(&content, path)
}

/// Parse a TOML string into a `WordList`.
pub fn parse_word_list_str(content: &str, source_path: &Path) -> Result<WordList> {
    let parsed: TomlWordFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let default_category: WordCategory = parsed
        .word_list
        .default_category
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let words = parsed
        .words
        .into_iter()
        .enumerate()
        .map(|(i, w)| {
            convert_word(w, default_category)
                .with_context(|| format!("word #{} in {}", i + 1, source_path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WordList {
        name: parsed.word_list.name,
        description: parsed.word_list.description,
        words,
    })
}

fn convert_word(word: TomlWord, default_category: WordCategory) -> Result<WordEntry> {
    let part_of_speech: PartOfSpeech = word
        .part_of_speech
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;
    let word_category = word
        .category
        .map(|c| c.parse().map_err(|e: String| anyhow::anyhow!("{}", e)))
        .transpose()?
        .unwrap_or(default_category);

    let mut forms = BTreeMap::new();
    match (word.source, word.target) {
        (Some(source), Some(target)) => {
            forms.insert(GrammarCategory::None, WordPair::new(source, target));
        }
        (None, None) => {}
        _ => anyhow::bail!("`source` and `target` must be given together"),
    }
    for (slot, pair) in word.forms {
        let slot: GrammarCategory = slot.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;
        if forms
            .insert(slot, WordPair::new(pair.source, pair.target))
            .is_some()
        {
            anyhow::bail!("grammar slot `{slot}` given twice");
        }
    }
    if forms.is_empty() {
        anyhow::bail!("word has no forms");
    }

    Ok(WordEntry {
        part_of_speech,
        word_category,
        context_hint: word.context.filter(|c| !c.trim().is_empty()),
        link: word.link.filter(|l| !l.trim().is_empty()),
        forms,
    })
}

/// Recursively load all `.toml` word lists from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_word_directory(dir: &Path) -> Result<Vec<WordList>> {
    let mut lists = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            lists.extend(load_word_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_word_list(&path) {
                Ok(list) => lists.push(list),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(lists)
}

/// Load a word-list file, or every word list under a directory.
pub fn load_word_lists(path: &Path) -> Result<Vec<WordList>> {
    if path.is_dir() {
        load_word_directory(path)
    } else {
        Ok(vec![parse_word_list(path)?])
    }
}

/// A warning from word-list validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// 1-based position of the word in its list, if applicable.
    pub word: Option<usize>,
    pub message: String,
}

/// Check a word list for problems that parse cleanly but would make poor questions.
pub fn validate_word_list(list: &WordList) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if list.words.is_empty() {
        warnings.push(ValidationWarning {
            word: None,
            message: "word list is empty".into(),
        });
    }

    let mut seen = HashSet::new();
    for (i, entry) in list.words.iter().enumerate() {
        let position = Some(i + 1);

        for slot in entry.misplaced_slots() {
            warnings.push(ValidationWarning {
                word: position,
                message: format!("slot `{slot}` does not apply to a {}", entry.part_of_speech),
            });
        }

        for (slot, pair) in &entry.forms {
            if variants(&pair.source).next().is_none() || variants(&pair.target).next().is_none() {
                warnings.push(ValidationWarning {
                    word: position,
                    message: format!("form `{slot}` has an empty side"),
                });
            }
        }

        let mut duplicate = None;
        for (slot, pair) in &entry.forms {
            let key = (entry.part_of_speech, *slot, pair.source.trim().to_lowercase());
            if !seen.insert(key) && duplicate.is_none() {
                duplicate = Some(pair.source.trim());
            }
        }
        if let Some(source) = duplicate {
            warnings.push(ValidationWarning {
                word: position,
                message: format!("duplicate {}: {}", entry.part_of_speech, source),
            });
        }
    }

    warnings
}
