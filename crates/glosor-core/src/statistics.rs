//! Mark history statistics.
//!
//! Per-inflection aggregates consumed by the selector, plus the session score
//! shown in the end-of-session summary.

use serde::{Deserialize, Serialize};

use crate::catalogue::HistoryEntry;
use crate::model::{GroupId, InflectionId, Mark};

/// How many of the most recent marks feed `mean_last_3`.
pub const RECENT_WINDOW: usize = 3;

/// Aggregates over one inflection's mark history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Number of marks with a usable value.
    pub count: u32,
    /// Mean of all marks. `None` when `count == 0`.
    pub mean: Option<f64>,
    /// Mean of the chronologically last (up to) three marks. `None` when `count == 0`.
    pub mean_last_3: Option<f64>,
}

/// Statistics for one sampled inflection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InflectionStatistic {
    pub inflection_id: InflectionId,
    pub group_id: GroupId,
    pub count: u32,
    pub mean: Option<f64>,
    pub mean_last_3: Option<f64>,
}

impl InflectionStatistic {
    pub fn new(inflection_id: InflectionId, group_id: GroupId, stats: HistoryStats) -> Self {
        Self {
            inflection_id,
            group_id,
            count: stats.count,
            mean: stats.mean,
            mean_last_3: stats.mean_last_3,
        }
    }

    /// At least one of the recent attempts was wrong.
    ///
    /// Inflections without history are never struggling.
    pub fn is_struggling(&self) -> bool {
        self.mean_last_3.is_some_and(|m| m < 1.0)
    }
}

/// Aggregate one inflection's history.
///
/// Marks whose value is missing or outside `0..=1` are excluded and logged.
/// The recent window is taken after a stable sort by timestamp ascending, so
/// marks without a timestamp count as the oldest.
pub fn summarize_history(history: &[HistoryEntry]) -> HistoryStats {
    let mut valid: Vec<&HistoryEntry> = Vec::with_capacity(history.len());
    for entry in history {
        match entry.value {
            Some(0) | Some(1) => valid.push(entry),
            other => {
                tracing::warn!(
                    "ignoring malformed mark {:?} recorded at {:?}",
                    other,
                    entry.timestamp
                );
            }
        }
    }

    if valid.is_empty() {
        return HistoryStats::default();
    }

    valid.sort_by_key(|entry| entry.timestamp);
    let values: Vec<f64> = valid
        .iter()
        .filter_map(|entry| entry.value)
        .map(|v| v as f64)
        .collect();
    let recent = &values[values.len().saturating_sub(RECENT_WINDOW)..];

    HistoryStats {
        count: values.len() as u32,
        mean: mean(&values),
        mean_last_3: mean(recent),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Percentage of correct marks, `None` for an empty slice.
pub fn score_percent(marks: &[Mark]) -> Option<f64> {
    if marks.is_empty() {
        return None;
    }
    let correct = marks.iter().filter(|m| m.is_correct()).count();
    Some(correct as f64 / marks.len() as f64 * 100.0)
}
