use serde::{Deserialize, Serialize};

use crate::store::Card;

/// Key under which a card's cached embedding is stored in `Card::data`.
pub const EMBEDDING_KEY: &str = "embedding";

/// An extracted or merged flashcard that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardCandidate {
    pub front: String,
    pub back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl CardCandidate {
    /// Trims both sides; `None` when either side ends up empty.
    pub fn new(front: &str, back: &str) -> Option<Self> {
        let front = front.trim();
        let back = back.trim();
        if front.is_empty() || back.is_empty() {
            return None;
        }
        Some(Self {
            front: front.to_string(),
            back: back.to_string(),
            embedding: None,
        })
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Card data sent to the store on create.
    pub fn to_card_data(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut data = serde_json::Map::new();
        data.insert("front".into(), self.front.clone().into());
        data.insert("back".into(), self.back.clone().into());
        if let Some(ref embedding) = self.embedding {
            data.insert(EMBEDDING_KEY.into(), serde_json::json!(embedding));
        }
        data
    }
}

/// A card already in the deck, viewed through the keys the pipeline reads.
#[derive(Debug, Clone)]
pub struct ExistingCard {
    pub id: String,
    pub front: String,
    pub embedding: Option<Vec<f32>>,
}

impl ExistingCard {
    /// A non-numeric or empty `embedding` value counts as missing.
    pub fn from_card(card: &Card) -> Self {
        let front = card
            .data
            .get("front")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let embedding = card
            .data
            .get(EMBEDDING_KEY)
            .and_then(|v| v.as_array())
            .and_then(|values| {
                values
                    .iter()
                    .map(|v| v.as_f64().map(|f| f as f32))
                    .collect::<Option<Vec<f32>>>()
            })
            .filter(|v| !v.is_empty());

        Self {
            id: card.id.clone(),
            front,
            embedding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card_with(data: serde_json::Value) -> Card {
        serde_json::from_value(json!({
            "id": "c1",
            "deckId": "d1",
            "userId": "u1",
            "data": data,
        }))
        .unwrap()
    }

    #[test]
    fn candidate_rejects_blank_sides() {
        assert!(CardCandidate::new("  ", "answer").is_none());
        assert!(CardCandidate::new("question", "\n").is_none());
        let c = CardCandidate::new("  What is ATP? ", " Energy currency ").unwrap();
        assert_eq!(c.front, "What is ATP?");
        assert_eq!(c.back, "Energy currency");
        assert!(c.embedding.is_none());
    }

    #[test]
    fn card_data_carries_embedding_when_present() {
        let c = CardCandidate::new("Q", "A").unwrap();
        assert!(!c.to_card_data().contains_key(EMBEDDING_KEY));

        let data = c.with_embedding(vec![0.5, 1.0]).to_card_data();
        assert_eq!(data["front"], "Q");
        assert_eq!(data["back"], "A");
        assert_eq!(data[EMBEDDING_KEY], json!([0.5, 1.0]));
    }

    #[test]
    fn existing_card_reads_cached_embedding() {
        let existing = ExistingCard::from_card(&card_with(json!({
            "front": "Hola",
            "back": "Hello",
            "embedding": [0.25, 0.75]
        })));
        assert_eq!(existing.front, "Hola");
        assert_eq!(existing.embedding, Some(vec![0.25, 0.75]));
    }

    #[test]
    fn existing_card_treats_garbage_embedding_as_missing() {
        let existing = ExistingCard::from_card(&card_with(json!({
            "front": "Hola",
            "embedding": ["nope"]
        })));
        assert!(existing.embedding.is_none());

        let empty = ExistingCard::from_card(&card_with(json!({ "embedding": [] })));
        assert!(empty.embedding.is_none());
        assert_eq!(empty.front, "");
    }
}
