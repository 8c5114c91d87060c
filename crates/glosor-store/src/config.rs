//! Configuration loading and the store factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use glosor_core::engine::SessionRequest;
use glosor_core::model::{CallLanguage, PartOfSpeech, WordCategory, WordFilter};

use crate::sqlite::SqliteStore;

/// Database path that selects a throwaway in-memory store.
pub const IN_MEMORY: &str = ":memory:";

/// Top-level glosor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlosorConfig {
    /// Path to the SQLite database. `${VAR}` references are expanded.
    pub database: String,
    pub words_per_round: usize,
    pub rounds: usize,
    pub call_language: CallLanguage,
    pub parts_of_speech: Vec<PartOfSpeech>,
    pub word_categories: Vec<WordCategory>,
    /// Play without writing marks.
    pub no_commit: bool,
    /// Fixed random seed for reproducible sessions.
    pub seed: Option<u64>,
    /// Where session reports are written. No reports when unset.
    pub report_dir: Option<PathBuf>,
}

impl Default for GlosorConfig {
    fn default() -> Self {
        Self {
            database: "glosor.db".to_string(),
            words_per_round: 5,
            rounds: 1,
            call_language: CallLanguage::Source,
            parts_of_speech: PartOfSpeech::ALL.to_vec(),
            word_categories: WordCategory::ALL.to_vec(),
            no_commit: false,
            seed: None,
            report_dir: None,
        }
    }
}

impl GlosorConfig {
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.database)
    }

    pub fn filter(&self) -> WordFilter {
        WordFilter::new(
            self.parts_of_speech.iter().copied(),
            self.word_categories.iter().copied(),
        )
    }

    pub fn session_request(&self) -> SessionRequest {
        SessionRequest {
            filter: self.filter(),
            n_words: self.words_per_round,
            n_rounds: self.rounds,
            call_language: self.call_language,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables expand to the empty string. Substituted values are not
/// expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + len];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `glosor.toml` in the current directory
/// 2. `~/.config/glosor/config.toml`
///
/// `GLOSOR_DATABASE` overrides the database path.
pub fn load_config() -> Result<GlosorConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GlosorConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("glosor.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => parse_config_file(path)?,
        None => GlosorConfig::default(),
    };

    if let Ok(database) = std::env::var("GLOSOR_DATABASE") {
        config.database = database;
    }
    config.database = resolve_env_vars(&config.database);
    config.report_dir = config
        .report_dir
        .map(|dir| PathBuf::from(resolve_env_vars(&dir.to_string_lossy())));

    tracing::debug!(
        source = ?config_path,
        database = %config.database,
        "loaded configuration"
    );
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<GlosorConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<GlosorConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("glosor"))
}

/// Open the store a configuration points at.
pub fn open_store(config: &GlosorConfig) -> Result<SqliteStore> {
    if config.database == IN_MEMORY {
        return SqliteStore::open_in_memory().context("failed to create in-memory database");
    }
    let path = config.database_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    SqliteStore::open(&path)
        .with_context(|| format!("failed to open database: {}", path.display()))
}
