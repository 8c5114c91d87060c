//! Inflection sampling.
//!
//! A session never shows two forms of the same word, so each word group is
//! represented by one inflection drawn uniformly at random. Statistics are
//! computed from that inflection's own history, not the group's.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalogue::Catalogue;
use crate::statistics::{summarize_history, InflectionStatistic};

/// Draw one inflection per word group and compute its statistics.
///
/// Returns exactly one row per distinct group in the catalogue, in ascending
/// group id order.
pub fn sample_inflections<R: Rng + ?Sized>(
    catalogue: &Catalogue,
    rng: &mut R,
) -> Vec<InflectionStatistic> {
    catalogue
        .groups()
        .into_values()
        .filter_map(|members| members.choose(rng).copied())
        .map(|entry| {
            InflectionStatistic::new(
                entry.inflection.id,
                entry.inflection.group_id,
                summarize_history(&entry.history),
            )
        })
        .collect()
}
