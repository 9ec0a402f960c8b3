use std::collections::{BTreeSet, VecDeque};

use super::is_similar;
use crate::card::CardCandidate;
use crate::config::ClusterMode;
use crate::error::Result;

/// Indices into the candidate list, ascending. The first index is the seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarityCluster {
    pub members: Vec<usize>,
}

impl SimilarityCluster {
    pub fn seed(&self) -> usize {
        self.members[0]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
}

/// Partition candidates into clusters; every index lands in exactly one.
///
/// Candidates are visited in order and each unclaimed one seeds a new
/// cluster. In [`ClusterMode::Seed`] the cluster absorbs later unclaimed
/// candidates similar to the seed itself, so two members need not be similar
/// to each other. In [`ClusterMode::Connected`] absorption continues from
/// every absorbed member until no unclaimed neighbour is left.
pub fn cluster(
    candidates: &[CardCandidate],
    threshold: f32,
    mode: ClusterMode,
) -> Result<Vec<SimilarityCluster>> {
    let mut claimed: BTreeSet<usize> = BTreeSet::new();
    let mut clusters = Vec::new();

    for seed in 0..candidates.len() {
        if !claimed.insert(seed) {
            continue;
        }

        let mut members = vec![seed];
        let mut frontier = VecDeque::from([seed]);

        while let Some(anchor) = frontier.pop_front() {
            let scan_from = match mode {
                ClusterMode::Seed => seed + 1,
                ClusterMode::Connected => 0,
            };
            for other in scan_from..candidates.len() {
                if claimed.contains(&other) {
                    continue;
                }
                if is_similar(
                    candidates[anchor].embedding.as_ref(),
                    candidates[other].embedding.as_ref(),
                    threshold,
                )? {
                    claimed.insert(other);
                    members.push(other);
                    if mode == ClusterMode::Connected {
                        frontier.push_back(other);
                    }
                }
            }
        }

        members.sort_unstable();
        clusters.push(SimilarityCluster { members });
    }

    Ok(clusters)
}
