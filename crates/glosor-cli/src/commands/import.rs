//! The `glosor import` command.

use std::path::Path;

use anyhow::{Context, Result};

use glosor_core::parser::{load_word_lists, validate_word_list};
use glosor_store::open_store;

pub fn execute(path: &Path, config: Option<&Path>, database: Option<&Path>) -> Result<()> {
    let config = super::load_config(config, database)?;
    let lists = load_word_lists(path)?;
    anyhow::ensure!(!lists.is_empty(), "no word lists found in {}", path.display());

    let store = open_store(&config)?;

    let mut groups = 0;
    let mut forms = 0;
    let mut skipped = 0;
    for list in &lists {
        for w in validate_word_list(list) {
            match w.word {
                Some(n) => eprintln!("  {} [word {n}] WARNING: {}", list.name, w.message),
                None => eprintln!("  {} WARNING: {}", list.name, w.message),
            }
        }
        for (i, entry) in list.words.iter().enumerate() {
            let added = store
                .insert_word_group(entry)
                .with_context(|| format!("failed to import word #{} of {}", i + 1, list.name))?;
            if added.group_id.is_some() {
                groups += 1;
            }
            forms += added.inserted;
            skipped += added.skipped;
        }
        tracing::info!(list = %list.name, words = list.words.len(), "imported word list");
    }

    println!(
        "Imported {groups} word groups ({forms} inflections) into {}",
        config.database
    );
    if skipped > 0 {
        println!("Skipped {skipped} word pair(s) already in the database.");
    }
    Ok(())
}
