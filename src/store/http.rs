use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;

use super::{Card, CardData, CardStore, Deck, DeckDraft, Paginated};
use crate::config::StoreConfig;
use crate::error::{CardsmithError, Result};

/// REST client for the card store.
///
/// Build one per process and share it; every request carries the
/// `X-API-Key` header when a key is configured.
pub struct HttpCardStore {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpCardStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(ref key) = self.api_key {
            req = req.header("X-API-Key", key);
        }
        req
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder, path: &str) -> Result<T> {
        let response = self.check(req.send().await?, path).await?;
        Ok(response.json().await?)
    }

    async fn check(&self, response: reqwest::Response, path: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(CardsmithError::Store {
            status: status.as_u16(),
            path: path.to_string(),
            body,
        })
    }

    // ── decks ────────────────────────────────────────────────────────────

    pub async fn list_decks(&self, owner_id: &str) -> Result<Vec<Deck>> {
        let path = decks_path(owner_id);
        let page: Paginated<Deck> = self.send(self.request(Method::GET, &path), &path).await?;
        Ok(page.items)
    }

    pub async fn create_deck(&self, owner_id: &str, draft: &DeckDraft) -> Result<Deck> {
        let path = decks_path(owner_id);
        self.send(self.request(Method::POST, &path).json(draft), &path)
            .await
    }

    pub async fn get_deck(&self, owner_id: &str, deck_id: &str) -> Result<Deck> {
        let path = deck_path(owner_id, deck_id);
        self.send(self.request(Method::GET, &path), &path).await
    }

    pub async fn update_deck(&self, owner_id: &str, deck_id: &str, draft: &DeckDraft) -> Result<Deck> {
        let path = deck_path(owner_id, deck_id);
        self.send(self.request(Method::PUT, &path).json(draft), &path)
            .await
    }

    pub async fn delete_deck(&self, owner_id: &str, deck_id: &str) -> Result<()> {
        let path = deck_path(owner_id, deck_id);
        self.check(self.request(Method::DELETE, &path).send().await?, &path)
            .await?;
        Ok(())
    }

    // ── single cards ─────────────────────────────────────────────────────

    pub async fn get_card(&self, owner_id: &str, deck_id: &str, card_id: &str) -> Result<Card> {
        let path = card_path(owner_id, deck_id, card_id);
        self.send(self.request(Method::GET, &path), &path).await
    }

    /// Full replacement of the card's data.
    pub async fn update_card(
        &self,
        owner_id: &str,
        deck_id: &str,
        card_id: &str,
        data: CardData,
    ) -> Result<Card> {
        let path = card_path(owner_id, deck_id, card_id);
        self.send(
            self.request(Method::PUT, &path)
                .json(&serde_json::json!({ "data": data })),
            &path,
        )
        .await
    }

    pub async fn delete_card(&self, owner_id: &str, deck_id: &str, card_id: &str) -> Result<()> {
        let path = card_path(owner_id, deck_id, card_id);
        self.check(self.request(Method::DELETE, &path).send().await?, &path)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CardStore for HttpCardStore {
    async fn list_cards(&self, owner_id: &str, deck_id: &str) -> Result<Vec<Card>> {
        let path = cards_path(owner_id, deck_id);
        let page: Paginated<Card> = self.send(self.request(Method::GET, &path), &path).await?;
        Ok(page.items)
    }

    async fn create_card(&self, owner_id: &str, deck_id: &str, data: CardData) -> Result<Card> {
        let path = cards_path(owner_id, deck_id);
        self.send(
            self.request(Method::POST, &path)
                .json(&serde_json::json!({ "data": data })),
            &path,
        )
        .await
    }

    async fn patch_card(
        &self,
        owner_id: &str,
        deck_id: &str,
        card_id: &str,
        data: CardData,
    ) -> Result<Card> {
        let path = card_path(owner_id, deck_id, card_id);
        self.send(
            self.request(Method::PATCH, &path)
                .json(&serde_json::json!({ "data": data })),
            &path,
        )
        .await
    }
}

fn decks_path(owner_id: &str) -> String {
    format!("/users/{}/decks", owner_id)
}

fn deck_path(owner_id: &str, deck_id: &str) -> String {
    format!("{}/{}", decks_path(owner_id), deck_id)
}

fn cards_path(owner_id: &str, deck_id: &str) -> String {
    format!("{}/cards", deck_path(owner_id, deck_id))
}

fn card_path(owner_id: &str, deck_id: &str, card_id: &str) -> String {
    format!("{}/{}", cards_path(owner_id, deck_id), card_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one HTTP request with a canned response and hands back
    /// the raw request text.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if raw.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "{}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn store_for(base_url: String) -> HttpCardStore {
        HttpCardStore::new(&StoreConfig {
            base_url,
            api_key: Some("secret".into()),
        })
    }

    #[test]
    fn paths_nest_under_owner_and_deck() {
        assert_eq!(decks_path("u"), "/users/u/decks");
        assert_eq!(cards_path("u", "d"), "/users/u/decks/d/cards");
        assert_eq!(card_path("u", "d", "c"), "/users/u/decks/d/cards/c");
    }

    #[tokio::test]
    async fn list_cards_sends_api_key_and_unwraps_items() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"items":[{"id":"c1","deckId":"d","userId":"u","data":{"front":"Q","back":"A"}}]}"#,
        )
        .await;

        let cards = store_for(url).list_cards("u", "d").await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front(), "Q");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /users/u/decks/d/cards "));
        assert!(request.to_ascii_lowercase().contains("x-api-key: secret"));
    }

    #[tokio::test]
    async fn patch_card_wraps_body_in_data() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"id":"c1","data":{"front":"Q","embedding":[1.0]}}"#,
        )
        .await;

        let mut data = CardData::new();
        data.insert("embedding".into(), serde_json::json!([1.0]));
        let card = store_for(url).patch_card("u", "d", "c1", data).await.unwrap();
        assert_eq!(card.id, "c1");

        let request = server.await.unwrap();
        assert!(request.starts_with("PATCH /users/u/decks/d/cards/c1 "));
        assert!(request.contains(r#"{"data":{"embedding":[1.0]}}"#));
    }

    #[tokio::test]
    async fn error_status_surfaces_as_store_error() {
        let (url, server) = serve_once("HTTP/1.1 404 Not Found", r#"{"error":"no deck"}"#).await;

        let err = store_for(url).list_cards("u", "missing").await.unwrap_err();
        match err {
            CardsmithError::Store { status, path, body } => {
                assert_eq!(status, 404);
                assert_eq!(path, "/users/u/decks/missing/cards");
                assert!(body.contains("no deck"));
            }
            other => panic!("unexpected error: {other}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn get_deck_reads_single_deck() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"id":"d1","userId":"u","name":"Biology","description":"Cells"}"#,
        )
        .await;

        let deck = store_for(url).get_deck("u", "d1").await.unwrap();
        assert_eq!(deck.name, "Biology");
        assert_eq!(deck.description.as_deref(), Some("Cells"));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /users/u/decks/d1 "));
    }

    #[tokio::test]
    async fn update_deck_puts_only_set_fields() {
        let (url, server) =
            serve_once("HTTP/1.1 200 OK", r#"{"id":"d1","name":"Cell biology"}"#).await;

        let draft = DeckDraft {
            name: Some("Cell biology".into()),
            description: None,
        };
        let deck = store_for(url).update_deck("u", "d1", &draft).await.unwrap();
        assert_eq!(deck.name, "Cell biology");

        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /users/u/decks/d1 "));
        assert!(request.ends_with(r#"{"name":"Cell biology"}"#));
    }

    #[tokio::test]
    async fn get_card_reads_single_card() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"id":"c1","deckId":"d","data":{"front":"Q","back":"A"},"fsrs":{"due":"2026-01-01"}}"#,
        )
        .await;

        let card = store_for(url).get_card("u", "d", "c1").await.unwrap();
        assert_eq!(card.back(), "A");
        assert!(card.fsrs.is_some());

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /users/u/decks/d/cards/c1 "));
    }

    #[tokio::test]
    async fn update_card_puts_body_wrapped_in_data() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"id":"c1","data":{"front":"Q2","back":"A2"}}"#,
        )
        .await;

        let mut data = CardData::new();
        data.insert("front".into(), "Q2".into());
        let card = store_for(url).update_card("u", "d", "c1", data).await.unwrap();
        assert_eq!(card.front(), "Q2");

        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /users/u/decks/d/cards/c1 "));
        assert!(request.ends_with(r#"{"data":{"front":"Q2"}}"#));
    }

    #[tokio::test]
    async fn delete_card_accepts_empty_response() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", "").await;

        store_for(url).delete_card("u", "d", "c1").await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("DELETE /users/u/decks/d/cards/c1 "));
    }

    #[tokio::test]
    async fn delete_deck_error_carries_path() {
        let (url, server) = serve_once("HTTP/1.1 403 Forbidden", "nope").await;

        let err = store_for(url).delete_deck("u", "d1").await.unwrap_err();
        assert!(matches!(
            err,
            CardsmithError::Store { status: 403, ref path, .. } if path == "/users/u/decks/d1"
        ));
        server.await.unwrap();
    }
}
