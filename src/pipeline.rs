//! End-to-end card generation.
//!
//! notes → chunks → extracted candidates → embedded candidates → drop those
//! already in the deck → cluster → merge → embed merged cards → create.
//! Existing cards without a cached embedding are backfilled while the
//! candidates are being embedded.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::card::{CardCandidate, ExistingCard};
use crate::config::{Config, PipelineConfig};
use crate::embeddings::{Embedder, EmbeddingProvider, EmbeddingService};
use crate::error::Result;
use crate::extractor::Extractor;
use crate::llm::{CompletionService, LlmClient};
use crate::merge::{MergeResolver, Resolution};
use crate::persist::{self, BackfillOutcome};
use crate::segment::segment;
use crate::similarity;
use crate::store::{Card, CardStore, HttpCardStore};

/// Per-stage counters for one run, alongside the created cards.
#[derive(Debug, Default, Clone, Serialize)]
pub struct GenerationReport {
    pub chunks: usize,
    pub failed_chunks: usize,
    pub candidates: usize,
    pub duplicates_of_existing: usize,
    pub clusters: usize,
    pub merged_clusters: usize,
    pub merge_fallbacks: usize,
    /// Merged cards dropped because they duplicate an existing card
    pub merged_duplicates: usize,
    pub backfilled: usize,
    pub backfill_failures: usize,
    /// Merged cards that could not be embedded and were not created
    pub unembedded_dropped: usize,
    pub created: Vec<Card>,
}

/// The generation pipeline with its three collaborators.
///
/// Build once per process and reuse across runs; runs share nothing but the
/// collaborators themselves.
pub struct CardPipeline {
    store: Arc<dyn CardStore>,
    extractor: Extractor,
    embedder: Embedder,
    resolver: MergeResolver,
    config: PipelineConfig,
}

impl CardPipeline {
    pub fn new(
        llm: Arc<dyn CompletionService>,
        embeddings: Arc<dyn EmbeddingService>,
        store: Arc<dyn CardStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            extractor: Extractor::new(llm.clone()),
            embedder: Embedder::new(embeddings),
            resolver: MergeResolver::new(llm),
            config,
        }
    }

    /// Wire up the HTTP clients described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let embeddings = EmbeddingProvider::from_config(&config.embed);
        tracing::debug!(
            llm = %config.llm.provider,
            model = %config.llm.model,
            embeddings = %embeddings.describe(),
            store = %config.store.base_url,
            "pipeline configured"
        );
        Self::new(
            Arc::new(LlmClient::new(&config.llm)),
            Arc::new(embeddings),
            Arc::new(HttpCardStore::new(&config.store)),
            config.pipeline.clone(),
        )
    }

    /// Generate cards from `text` into the deck and return the created cards.
    pub async fn generate_cards(&self, owner_id: &str, deck_id: &str, text: &str) -> Result<Vec<Card>> {
        Ok(self.generate(owner_id, deck_id, text).await?.created)
    }

    /// Like [`CardPipeline::generate_cards`], with per-stage counters.
    pub async fn generate(&self, owner_id: &str, deck_id: &str, text: &str) -> Result<GenerationReport> {
        let preview: String = text.chars().take(100).collect();
        tracing::info!(deck_id, preview = %preview, "generating cards");

        let cfg = &self.config;
        let threshold = cfg.similarity_threshold;
        let mut report = GenerationReport::default();

        let chunks = segment(text, cfg.chunk_size_words, cfg.overlap_words);
        report.chunks = chunks.len();

        let extraction = self.extractor.extract_all(&chunks, cfg.max_concurrency).await;
        report.failed_chunks = extraction.failed_chunks;
        let mut candidates = extraction.candidates;
        report.candidates = candidates.len();
        tracing::debug!(
            chunks = report.chunks,
            failed = report.failed_chunks,
            candidates = report.candidates,
            "extraction finished"
        );

        // Both sides finish before either error is acted on.
        let (embedded, existing) = tokio::join!(
            self.embedder.embed_missing(&mut candidates),
            self.load_existing(owner_id, deck_id),
        );
        let (existing, backfill) = existing?;
        report.backfilled = backfill.patched;
        report.backfill_failures = backfill.failed;
        if let Err(e) = embedded {
            tracing::error!(error = %e, candidates = candidates.len(), "embedding candidates failed, aborting run");
            return Err(e);
        }

        let (unique, dropped) = similarity::filter_against_existing(candidates, &existing, threshold)?;
        report.duplicates_of_existing = dropped;

        let clusters = similarity::cluster(&unique, threshold, cfg.cluster_mode)?;
        report.clusters = clusters.len();
        tracing::debug!(
            unique = unique.len(),
            dropped,
            clusters = clusters.len(),
            "similarity pass finished"
        );

        let mut slots: Vec<Option<CardCandidate>> = unique.into_iter().map(Some).collect();
        let groups: Vec<Vec<CardCandidate>> = clusters
            .iter()
            .map(|c| c.members.iter().filter_map(|&i| slots[i].take()).collect())
            .collect();

        let resolved: Vec<(Vec<CardCandidate>, Resolution)> = stream::iter(groups)
            .map(|group| self.resolver.resolve(group))
            .buffered(cfg.max_concurrency.max(1))
            .collect()
            .await;

        let mut final_cards = Vec::new();
        for (cards, resolution) in resolved {
            match resolution {
                Resolution::Merged => report.merged_clusters += 1,
                Resolution::FellBack => report.merge_fallbacks += 1,
                Resolution::Unchanged => {}
            }
            final_cards.extend(cards);
        }

        let final_cards = self.finalize(final_cards, &existing, &mut report).await?;

        let created = persist::create_cards(
            self.store.as_ref(),
            owner_id,
            deck_id,
            final_cards,
            cfg.max_concurrency,
        )
        .await?;

        tracing::info!(deck_id, created = created.len(), "cards created");
        report.created = created;
        Ok(report)
    }

    /// List the deck and backfill any card missing a cached embedding.
    async fn load_existing(
        &self,
        owner_id: &str,
        deck_id: &str,
    ) -> Result<(Vec<ExistingCard>, BackfillOutcome)> {
        let cards = self.store.list_cards(owner_id, deck_id).await?;
        let mut existing: Vec<ExistingCard> = cards.iter().map(ExistingCard::from_card).collect();

        let outcome = persist::backfill_embeddings(
            self.store.as_ref(),
            &self.embedder,
            owner_id,
            deck_id,
            &mut existing,
        )
        .await
        .inspect_err(|e| tracing::error!(error = %e, "embedding existing cards failed"))?;

        if outcome.embedded > 0 {
            tracing::debug!(
                embedded = outcome.embedded,
                patched = outcome.patched,
                failed = outcome.failed,
                "backfilled existing cards"
            );
        }
        Ok((existing, outcome))
    }

    /// Embed cards the merge step produced and drop any that turn out to
    /// duplicate an existing card. If that embedding batch fails, only the
    /// merged cards are lost.
    async fn finalize(
        &self,
        mut cards: Vec<CardCandidate>,
        existing: &[ExistingCard],
        report: &mut GenerationReport,
    ) -> Result<Vec<CardCandidate>> {
        let fresh: Vec<bool> = cards.iter().map(|c| c.embedding.is_none()).collect();
        let fresh_count = fresh.iter().filter(|f| **f).count();
        if fresh_count == 0 {
            return Ok(cards);
        }

        if let Err(e) = self.embedder.embed_missing(&mut cards).await {
            tracing::error!(error = %e, cards = fresh_count, "embedding merged cards failed, skipping them");
            report.unembedded_dropped = fresh_count;
            cards.retain(|c| c.embedding.is_some());
            return Ok(cards);
        }

        let mut kept = Vec::with_capacity(cards.len());
        for (card, is_fresh) in cards.into_iter().zip(fresh) {
            if is_fresh
                && similarity::covered_by_existing(&card, existing, self.config.similarity_threshold)?
            {
                report.merged_duplicates += 1;
                continue;
            }
            kept.push(card);
        }
        Ok(kept)
    }
}
