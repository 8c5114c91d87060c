//! Session summary report with JSON persistence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{CallLanguage, InflectionId};

/// Summary of one session's primary pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub call_language: CallLanguage,
    /// Words requested per round.
    pub n_words: usize,
    pub n_rounds: usize,
    /// Questions answered in the primary pass.
    pub answered: usize,
    pub correct: usize,
    /// `None` when nothing was answered.
    pub score_percent: Option<f64>,
    /// Words answered wrongly at least once.
    pub missed: Vec<MissedWord>,
    pub retest_taken: bool,
    pub committed_marks: usize,
    pub pending_marks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedWord {
    pub id: InflectionId,
    pub question: String,
    pub answer: String,
}

impl SessionReport {
    /// Default file name inside a report directory.
    pub fn file_name(&self) -> String {
        format!(
            "session-{}-{}.json",
            self.started_at.format("%Y%m%dT%H%M%S"),
            self.session_id.simple()
        )
    }

    /// Save the report as pretty JSON, creating parent directories.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Save under `dir` using [`SessionReport::file_name`].
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        self.save_json(&path)?;
        Ok(path)
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionReport {
        SessionReport {
            session_id: Uuid::nil(),
            started_at: Utc::now(),
            generated_at: Utc::now(),
            call_language: CallLanguage::Target,
            n_words: 3,
            n_rounds: 1,
            answered: 3,
            correct: 2,
            score_percent: Some(200.0 / 3.0),
            missed: vec![MissedWord {
                id: 2,
                question: "hund".into(),
                answer: "dog".into(),
            }],
            retest_taken: false,
            committed_marks: 3,
            pending_marks: 0,
        }
    }

    #[test]
    fn json_roundtrip() {
        let report = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = SessionReport::load_json(&path).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn save_in_uses_session_file_name() {
        let report = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = report.save_in(dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("session-"), "got {name}");
        assert!(name.ends_with(".json"));
        assert!(path.exists());
    }

    #[test]
    fn load_missing_file_mentions_path() {
        let err = SessionReport::load_json(Path::new("/nonexistent/report.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/report.json"));
    }
}
