//! The `glosor prune` command.

use std::path::Path;

use anyhow::Result;

use glosor_store::open_store;

pub fn execute(config: Option<&Path>, database: Option<&Path>) -> Result<()> {
    let config = super::load_config(config, database)?;
    let store = open_store(&config)?;
    let summary = store.prune_orphan_marks()?;

    if summary.removed_marks == 0 {
        println!("No old marks found.");
    } else {
        println!(
            "Removed {} marks from {} unique words.",
            summary.removed_marks, summary.removed_words
        );
    }
    Ok(())
}
