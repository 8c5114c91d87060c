//! The `glosor init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("glosor.toml").exists() {
        println!("glosor.toml already exists, skipping.");
    } else {
        std::fs::write("glosor.toml", SAMPLE_CONFIG)?;
        println!("Created glosor.toml");
    }

    std::fs::create_dir_all("words")?;
    let example_path = std::path::Path::new("words/example.toml");
    if example_path.exists() {
        println!("words/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_WORD_LIST)?;
        println!("Created words/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: glosor validate words/example.toml");
    println!("  2. Run: glosor import words/example.toml");
    println!("  3. Run: glosor play");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# glosor configuration

database = "glosor.db"
words_per_round = 5
rounds = 1
# Side shown as the question: "source" or "target".
call_language = "source"
parts_of_speech = ["noun", "verb", "adjective", "adverb", "phrase", "preposition", "conjunction"]
# word_categories = ["general", "food", "animals"]
no_commit = false
# seed = 42
# report_dir = "reports"
"#;

const EXAMPLE_WORD_LIST: &str = r#"[word_list]
name = "Example"
description = "A few Swedish words to get started"
default_category = "general"

[[words]]
part_of_speech = "noun"
category = "animals"
context = "pet"
link = "https://sv.wiktionary.org/wiki/hund"

[words.forms]
indefinite-singular = { source = "en hund", target = "a dog" }
definite-singular = { source = "hunden", target = "the dog" }
indefinite-plural = { source = "hundar", target = "dogs" }
definite-plural = { source = "hundarna", target = "the dogs" }

[[words]]
part_of_speech = "verb"
category = "sport"

[words.forms]
infinitive = { source = "springa", target = "run/to run" }
present = { source = "springer", target = "runs" }
past = { source = "sprang", target = "ran" }
present-perfect = { source = "har sprungit", target = "has run" }

[[words]]
part_of_speech = "adjective"

[words.forms]
utrum = { source = "snabb", target = "fast/quick" }
neutrum = { source = "snabbt", target = "fast/quick" }
adjective-plural = { source = "snabba", target = "fast/quick" }
comparative = { source = "snabbare", target = "faster/quicker" }
superlative = { source = "snabbast", target = "fastest/quickest" }

[[words]]
part_of_speech = "phrase"
source = "hur mår du?"
target = "how are you?"

[[words]]
part_of_speech = "adverb"
category = "time"
source = "ofta"
target = "often"
"#;
