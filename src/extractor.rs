use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::card::CardCandidate;
use crate::error::Result;
use crate::llm::{self, prompts, CompletionService};
use crate::segment::Chunk;

/// Candidates pulled from every chunk, plus how many chunks failed.
#[derive(Debug, Default)]
pub struct Extraction {
    pub candidates: Vec<CardCandidate>,
    pub failed_chunks: usize,
}

/// Asks the completion service for atomic cards, one chunk at a time.
#[derive(Clone)]
pub struct Extractor {
    llm: Arc<dyn CompletionService>,
}

impl Extractor {
    pub fn new(llm: Arc<dyn CompletionService>) -> Self {
        Self { llm }
    }

    /// Cards for a single chunk. Transport errors and unparseable output are
    /// returned as errors; the caller decides whether they are fatal.
    pub async fn extract(&self, chunk: &Chunk) -> Result<Vec<CardCandidate>> {
        let response = self
            .llm
            .complete(prompts::CARD_EXTRACTION_SYSTEM, &chunk.text)
            .await?;
        llm::parse_cards(&response)
    }

    /// Run [`Extractor::extract`] over all chunks with at most `concurrency`
    /// requests in flight. A failed chunk contributes no candidates. Output
    /// keeps chunk order.
    pub async fn extract_all(&self, chunks: &[Chunk], concurrency: usize) -> Extraction {
        let results: Vec<(usize, Result<Vec<CardCandidate>>)> = stream::iter(chunks)
            .map(|chunk| async move { (chunk.start_word_index, self.extract(chunk).await) })
            .buffered(concurrency.max(1))
            .collect()
            .await;

        let mut extraction = Extraction::default();
        for (start_word, result) in results {
            match result {
                Ok(cards) => {
                    tracing::debug!(start_word, cards = cards.len(), "chunk extracted");
                    extraction.candidates.extend(cards);
                }
                Err(e) => {
                    tracing::warn!(start_word, error = %e, "card extraction failed for chunk");
                    extraction.failed_chunks += 1;
                }
            }
        }
        extraction
    }
}
