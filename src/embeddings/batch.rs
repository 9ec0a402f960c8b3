use std::sync::Arc;

use super::EmbeddingService;
use crate::card::CardCandidate;
use crate::error::{CardsmithError, Result};

/// Batching front-end over an [`EmbeddingService`].
///
/// Every call is one request to the service. A response that does not line up
/// with the input (wrong count, ragged or empty vectors) fails the whole batch.
#[derive(Clone)]
pub struct Embedder {
    service: Arc<dyn EmbeddingService>,
}

impl Embedder {
    pub fn new(service: Arc<dyn EmbeddingService>) -> Self {
        Self { service }
    }

    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.service.embed_batch(texts).await?;

        if vectors.len() != texts.len() {
            return Err(CardsmithError::Embedding(format!(
                "expected {} vectors, got {}",
                texts.len(),
                vectors.len()
            )));
        }

        let dim = vectors[0].len();
        if dim == 0 {
            return Err(CardsmithError::Embedding("service returned empty vectors".into()));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(CardsmithError::DimensionMismatch {
                left: dim,
                right: bad.len(),
            });
        }

        Ok(vectors)
    }

    /// Embed the `front` of every candidate that has no vector yet.
    ///
    /// Returns how many candidates were embedded. On error nothing is attached.
    pub async fn embed_missing(&self, candidates: &mut [CardCandidate]) -> Result<usize> {
        let missing: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.embedding.is_none())
            .map(|(i, _)| i)
            .collect();

        let texts: Vec<String> = missing
            .iter()
            .map(|&i| candidates[i].front.clone())
            .collect();
        let vectors = self.embed(&texts).await?;

        for (i, vector) in missing.iter().zip(vectors) {
            candidates[*i].embedding = Some(vector);
        }

        Ok(missing.len())
    }
}
