//! Embedding-based duplicate detection.
//!
//! Two passes share the same cosine threshold: [`dedup::filter_against_existing`]
//! removes candidates already covered by the deck, and [`cluster::cluster`]
//! groups the survivors that look like each other so the merge resolver can
//! collapse them.

pub mod cluster;
pub mod dedup;

pub use cluster::{cluster, SimilarityCluster};
pub use dedup::{covered_by_existing, filter_against_existing};

use crate::embeddings::cosine_similarity;
use crate::error::Result;

/// `true` when both vectors exist and their similarity is strictly above `threshold`.
pub(crate) fn is_similar(
    a: Option<&Vec<f32>>,
    b: Option<&Vec<f32>>,
    threshold: f32,
) -> Result<bool> {
    match (a, b) {
        (Some(a), Some(b)) => Ok(cosine_similarity(a, b)? > threshold),
        _ => Ok(false),
    }
}
