//! The `glosor validate` command.

use std::path::Path;

use anyhow::Result;

use glosor_core::parser::{load_word_lists, validate_word_list};

pub fn execute(path: &Path) -> Result<()> {
    let lists = load_word_lists(path)?;
    anyhow::ensure!(!lists.is_empty(), "no word lists found in {}", path.display());

    let mut total_warnings = 0;

    for list in &lists {
        let forms: usize = list.words.iter().map(|w| w.forms.len()).sum();
        println!(
            "Word list: {} ({} words, {} forms)",
            list.name,
            list.words.len(),
            forms
        );

        let warnings = validate_word_list(list);
        for w in &warnings {
            let prefix = w
                .word
                .map(|n| format!("  [word {n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All word lists valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
