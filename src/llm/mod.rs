pub mod client;
pub mod prompts;

use async_trait::async_trait;
use serde::Deserialize;

use crate::card::CardCandidate;
use crate::error::{CardsmithError, Result};

pub use client::LlmClient;

/// A chat model that answers one system instruction plus one user message.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct CardsEnvelope {
    cards: Vec<serde_json::Value>,
}

/// A card entry with string `front` and `back`; anything else is skipped.
fn card_from_value(value: &serde_json::Value) -> Option<CardCandidate> {
    let front = value.get("front")?.as_str()?;
    let back = value.get("back")?.as_str()?;
    CardCandidate::new(front, back)
}

/// Pull the JSON object out of a model response (models like to wrap it in
/// Markdown fences or a sentence of prose).
pub fn extract_json_block(response: &str) -> &str {
    let fenced = if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
    } else if response.contains("```") {
        response.split("```").nth(1)
    } else {
        None
    };

    let candidate = fenced.unwrap_or(response).trim();
    match (candidate.find('{'), candidate.rfind('}')) {
        (Some(start), Some(end)) if start < end => &candidate[start..=end],
        _ => candidate,
    }
}

/// Parse a `{"cards": [{"front", "back"}]}` response into candidates.
///
/// The response is tried as plain JSON first, then through
/// [`extract_json_block`]. Cards with a blank or non-string side are dropped.
/// A response that is not JSON, or has no `cards` array, is an error.
pub fn parse_cards(response: &str) -> Result<Vec<CardCandidate>> {
    let envelope: CardsEnvelope = match serde_json::from_str(response.trim()) {
        Ok(envelope) => envelope,
        Err(_) => serde_json::from_str(extract_json_block(response)).map_err(|e| {
            let preview: String = response.chars().take(200).collect();
            CardsmithError::MalformedOutput(format!("{} (response starts: {:?})", e, preview))
        })?,
    };

    let total = envelope.cards.len();
    let cards: Vec<CardCandidate> = envelope.cards.iter().filter_map(card_from_value).collect();
    if cards.len() < total {
        tracing::debug!(skipped = total - cards.len(), "dropped unusable cards from model output");
    }
    Ok(cards)
}
