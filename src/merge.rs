use std::sync::Arc;

use crate::card::CardCandidate;
use crate::error::{CardsmithError, Result};
use crate::llm::{self, prompts, CompletionService};

/// What happened to one cluster during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Single-member cluster, passed through
    Unchanged,
    /// The model returned a replacement set
    Merged,
    /// The model call or its output failed; first member kept
    FellBack,
}

/// Collapses clusters of near-duplicate candidates into a minimal set.
#[derive(Clone)]
pub struct MergeResolver {
    llm: Arc<dyn CompletionService>,
}

impl MergeResolver {
    pub fn new(llm: Arc<dyn CompletionService>) -> Self {
        Self { llm }
    }

    /// Singletons come back untouched. Larger clusters are rewritten by the
    /// model; if that fails, only the first member survives. Merged cards have
    /// no embedding yet.
    pub async fn resolve(&self, cluster: Vec<CardCandidate>) -> (Vec<CardCandidate>, Resolution) {
        if cluster.len() <= 1 {
            return (cluster, Resolution::Unchanged);
        }

        match self.merge(&cluster).await {
            Ok(merged) => (merged, Resolution::Merged),
            Err(e) => {
                tracing::warn!(
                    size = cluster.len(),
                    seed = %cluster[0].front,
                    error = %e,
                    "card merge failed, keeping first card of cluster"
                );
                (cluster.into_iter().take(1).collect(), Resolution::FellBack)
            }
        }
    }

    async fn merge(&self, cluster: &[CardCandidate]) -> Result<Vec<CardCandidate>> {
        let response = self
            .llm
            .complete(
                prompts::DEDUPLICATION_SYSTEM,
                &prompts::deduplication_prompt(cluster),
            )
            .await?;

        let merged = llm::parse_cards(&response)?;
        if merged.is_empty() {
            return Err(CardsmithError::MalformedOutput(
                "merge returned no usable cards".into(),
            ));
        }
        Ok(merged)
    }
}
