//! Greedy seed-relative clustering.

use super::NormalizedRecord;
use super::similarity::score;

/// Default minimum score for a record to join a seed's cluster.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// A group of records judged to describe the same work.
#[derive(Debug, Clone)]
pub struct Cluster {
    members: Vec<NormalizedRecord>,
    canonical: usize,
}

impl Cluster {
    fn new(members: Vec<NormalizedRecord>) -> Self {
        // First member with the highest priority, i.e. the head of a stable
        // descending sort.
        let canonical = members
            .iter()
            .enumerate()
            .fold(0, |best, (i, m)| if m.priority() > members[best].priority() { i } else { best });
        Self { members, canonical }
    }

    /// The representative record of this cluster.
    pub fn canonical(&self) -> &NormalizedRecord {
        &self.members[self.canonical]
    }

    /// Members in input order; the first is the seed.
    pub fn members(&self) -> &[NormalizedRecord] {
        &self.members
    }

    pub fn seed(&self) -> &NormalizedRecord {
        &self.members[0]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Partition `records` into clusters.
///
/// Each record not yet assigned opens a cluster, and every later unassigned
/// record scoring at least `threshold` against that seed joins it. Members
/// are never compared with each other, so the grouping is not transitive.
pub fn build_clusters(records: Vec<NormalizedRecord>, threshold: f64) -> Vec<Cluster> {
    let mut pending: Vec<Option<NormalizedRecord>> = records.into_iter().map(Some).collect();
    let mut clusters = Vec::new();

    let mut next = 0;
    while next < pending.len() {
        let Some(seed) = pending[next].take() else {
            next += 1;
            continue;
        };

        let mut members = vec![seed];
        for slot in pending.iter_mut().skip(next + 1) {
            if slot.as_ref().is_some_and(|candidate| score(&members[0], candidate) >= threshold) {
                members.extend(slot.take());
            }
        }

        clusters.push(Cluster::new(members));
        next += 1;
    }

    tracing::trace!(clusters = clusters.len(), "built clusters");
    clusters
}
