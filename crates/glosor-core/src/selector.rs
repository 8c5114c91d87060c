//! Bucketed word selection.
//!
//! A session is assembled from three buckets, each claiming word groups the
//! previous buckets left alone:
//!
//! 1. **struggling**: a wrong answer among the last three attempts, weakest first;
//! 2. **under-practised**: fewest recorded answers first;
//! 3. **filler**: a uniform random draw from whatever remains.
//!
//! The first two buckets take `target_total / 3` words each; the filler bucket
//! tops the session up to `target_total` when enough groups exist.

use std::cmp::Ordering;
use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{GroupId, InflectionId};
use crate::statistics::InflectionStatistic;

/// The words chosen for a session, by bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub struggling: Vec<InflectionStatistic>,
    pub under_practised: Vec<InflectionStatistic>,
    pub filler: Vec<InflectionStatistic>,
}

impl Selection {
    /// Inflection ids in bucket order.
    pub fn ids(&self) -> Vec<InflectionId> {
        self.iter().map(|s| s.inflection_id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InflectionStatistic> {
        self.struggling
            .iter()
            .chain(&self.under_practised)
            .chain(&self.filler)
    }

    pub fn len(&self) -> usize {
        self.struggling.len() + self.under_practised.len() + self.filler.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Quota of each of the two ranked buckets.
pub fn words_per_bucket(target_total: usize) -> usize {
    target_total / 3
}

/// Select up to `target_total` inflections, at most one per word group.
///
/// Returns fewer words when fewer groups are available; that is not an error.
pub fn select<R: Rng + ?Sized>(
    statistics: &[InflectionStatistic],
    target_total: usize,
    rng: &mut R,
) -> Selection {
    let quota = words_per_bucket(target_total);
    let mut claimed: HashSet<GroupId> = HashSet::new();

    let struggling = select_struggling(statistics, quota, &mut claimed);
    let under_practised = select_under_practised(statistics, quota, &mut claimed);
    let remaining = target_total.saturating_sub(struggling.len() + under_practised.len());
    let filler = select_filler(statistics, remaining, &mut claimed, rng);

    tracing::debug!(
        struggling = struggling.len(),
        under_practised = under_practised.len(),
        filler = filler.len(),
        target_total,
        "selected session words"
    );

    Selection {
        struggling,
        under_practised,
        filler,
    }
}

/// Struggling inflections, ascending by `(mean_last_3, mean)`.
///
/// Ties on the recent mean go to the inflection with the lower lifetime mean,
/// so chronic low performers rank above recently unlucky ones.
pub fn select_struggling(
    statistics: &[InflectionStatistic],
    limit: usize,
    claimed: &mut HashSet<GroupId>,
) -> Vec<InflectionStatistic> {
    let mut candidates: Vec<&InflectionStatistic> = statistics
        .iter()
        .filter(|s| s.is_struggling() && !claimed.contains(&s.group_id))
        .collect();
    candidates.sort_by(|a, b| {
        cmp_defined(a.mean_last_3, b.mean_last_3).then_with(|| cmp_defined(a.mean, b.mean))
    });
    take_unclaimed(candidates, limit, claimed)
}

/// Unclaimed inflections with the fewest recorded answers.
pub fn select_under_practised(
    statistics: &[InflectionStatistic],
    limit: usize,
    claimed: &mut HashSet<GroupId>,
) -> Vec<InflectionStatistic> {
    let mut candidates: Vec<&InflectionStatistic> = statistics
        .iter()
        .filter(|s| !claimed.contains(&s.group_id))
        .collect();
    candidates.sort_by_key(|s| s.count);
    take_unclaimed(candidates, limit, claimed)
}

/// A uniform draw without replacement from the unclaimed groups.
pub fn select_filler<R: Rng + ?Sized>(
    statistics: &[InflectionStatistic],
    limit: usize,
    claimed: &mut HashSet<GroupId>,
    rng: &mut R,
) -> Vec<InflectionStatistic> {
    let mut seen: HashSet<GroupId> = HashSet::new();
    let mut pool: Vec<&InflectionStatistic> = statistics
        .iter()
        .filter(|s| !claimed.contains(&s.group_id) && seen.insert(s.group_id))
        .collect();
    pool.shuffle(rng);
    take_unclaimed(pool, limit, claimed)
}

/// Take candidates in order, skipping groups already claimed, until `limit`.
fn take_unclaimed(
    candidates: Vec<&InflectionStatistic>,
    limit: usize,
    claimed: &mut HashSet<GroupId>,
) -> Vec<InflectionStatistic> {
    let mut taken = Vec::with_capacity(limit.min(candidates.len()));
    for stat in candidates {
        if taken.len() == limit {
            break;
        }
        if claimed.insert(stat.group_id) {
            taken.push(*stat);
        }
    }
    taken
}

/// Total order over optional means; undefined sorts last.
fn cmp_defined(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
