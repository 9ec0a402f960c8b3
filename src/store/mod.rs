//! Card store: the external system of record for decks and cards.
//!
//! The pipeline only needs `list_cards`, `create_card` and `patch_card`, so
//! those form the [`CardStore`] trait. [`HttpCardStore`] implements it against
//! the REST API and additionally exposes the deck and single-card endpoints
//! used by the CLI.

pub mod http;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use http::HttpCardStore;

pub type CardData = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub deck_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub data: CardData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Scheduler state owned by the store; carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fsrs: Option<serde_json::Value>,
}

impl Card {
    pub fn front(&self) -> &str {
        self.data
            .get("front")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
    }

    pub fn back(&self) -> &str {
        self.data
            .get("back")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for deck create/update
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeckDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
}

/// The subset of the card store the generation pipeline depends on.
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn list_cards(&self, owner_id: &str, deck_id: &str) -> Result<Vec<Card>>;

    async fn create_card(&self, owner_id: &str, deck_id: &str, data: CardData) -> Result<Card>;

    /// Partial update: keys in `data` are merged into the card's existing data.
    async fn patch_card(
        &self,
        owner_id: &str,
        deck_id: &str,
        card_id: &str,
        data: CardData,
    ) -> Result<Card>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn card_parses_store_payload() {
        let card: Card = serde_json::from_value(json!({
            "id": "card-1",
            "deckId": "deck-1",
            "userId": "user-1",
            "data": { "front": "Q", "back": "A" },
            "createdAt": "2025-01-02T03:04:05Z",
            "updatedAt": "2025-01-02T03:04:05Z",
            "fsrs": { "state": "New", "reps": 0 }
        }))
        .unwrap();

        assert_eq!(card.deck_id, "deck-1");
        assert_eq!(card.front(), "Q");
        assert_eq!(card.back(), "A");
        assert!(card.created_at.is_some());
        assert_eq!(card.fsrs.unwrap()["state"], "New");
    }

    #[test]
    fn deck_draft_omits_unset_fields() {
        let draft = DeckDraft {
            name: Some("Spanish".into()),
            description: None,
        };
        assert_eq!(serde_json::to_value(&draft).unwrap(), json!({ "name": "Spanish" }));
    }
}
