use futures::stream::{self, StreamExt, TryStreamExt};

use crate::card::{CardCandidate, ExistingCard, EMBEDDING_KEY};
use crate::embeddings::Embedder;
use crate::error::Result;
use crate::store::{Card, CardData, CardStore};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackfillOutcome {
    /// Existing cards that got a vector in this run
    pub embedded: usize,
    /// ... of which the store accepted the patch
    pub patched: usize,
    pub failed: usize,
}

/// Embed every existing card that has a front but no cached vector, attach
/// the vectors in memory, and patch each card in the store.
///
/// The embedding call is one batch and its failure is returned. Patches run
/// concurrently and a failed patch only leaves that card unpatched.
pub async fn backfill_embeddings(
    store: &dyn CardStore,
    embedder: &Embedder,
    owner_id: &str,
    deck_id: &str,
    existing: &mut [ExistingCard],
) -> Result<BackfillOutcome> {
    let missing: Vec<usize> = existing
        .iter()
        .enumerate()
        .filter(|(_, c)| c.embedding.is_none() && !c.front.trim().is_empty())
        .map(|(i, _)| i)
        .collect();

    if missing.is_empty() {
        return Ok(BackfillOutcome::default());
    }

    let texts: Vec<String> = missing.iter().map(|&i| existing[i].front.clone()).collect();
    let vectors = embedder.embed(&texts).await?;

    for (&i, vector) in missing.iter().zip(vectors) {
        existing[i].embedding = Some(vector);
    }

    let existing: &[ExistingCard] = existing;
    let patches = missing.iter().map(|&i| {
        let card = &existing[i];
        let mut data = CardData::new();
        data.insert(EMBEDDING_KEY.into(), serde_json::json!(card.embedding));
        async move {
            let result = store.patch_card(owner_id, deck_id, &card.id, data).await;
            (card.id.as_str(), result)
        }
    });

    let mut outcome = BackfillOutcome {
        embedded: missing.len(),
        ..Default::default()
    };
    for (card_id, result) in futures::future::join_all(patches).await {
        match result {
            Ok(_) => outcome.patched += 1,
            Err(e) => {
                tracing::warn!(card_id, error = %e, "failed to persist embedding for card");
                outcome.failed += 1;
            }
        }
    }

    Ok(outcome)
}

/// Create one store card per candidate, at most `concurrency` at a time.
/// The returned cards follow the input order.
///
/// Candidates without an embedding are never written. The first store error
/// stops further creates and is returned.
pub async fn create_cards(
    store: &dyn CardStore,
    owner_id: &str,
    deck_id: &str,
    candidates: Vec<CardCandidate>,
    concurrency: usize,
) -> Result<Vec<Card>> {
    let (ready, unembedded): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| c.embedding.is_some());

    for card in &unembedded {
        tracing::warn!(front = %card.front, "skipping card without embedding");
    }

    stream::iter(ready)
        .map(|candidate| async move {
            store
                .create_card(owner_id, deck_id, candidate.to_card_data())
                .await
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}
