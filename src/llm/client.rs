use async_trait::async_trait;
use serde::Deserialize;

use super::CompletionService;
use crate::auth::providers::{Provider, ResolvedProvider};
use crate::error::{CardsmithError, Result};

/// Sampling temperature for extraction and merge prompts
const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: u32 = 4096;
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Chat completion client for the configured provider.
///
/// Anthropic gets the Messages API; OpenAI and Ollama share the
/// OpenAI-compatible `/chat/completions` shape.
pub struct LlmClient {
    provider: Provider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl LlmClient {
    pub fn new(resolved: &ResolvedProvider) -> Self {
        Self {
            provider: resolved.provider,
            endpoint: resolved.endpoint.trim_end_matches('/').to_string(),
            model: resolved.model.clone(),
            api_key: resolved.api_key.clone(),
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
        }
    }

    fn request_body(&self, system: &str, user: &str) -> serde_json::Value {
        match self.provider {
            Provider::Anthropic => serde_json::json!({
                "model": self.model,
                "max_tokens": MAX_TOKENS,
                "temperature": TEMPERATURE,
                "system": system,
                "messages": [{ "role": "user", "content": user }],
            }),
            Provider::OpenAI | Provider::Ollama => serde_json::json!({
                "model": self.model,
                "max_tokens": MAX_TOKENS,
                "temperature": TEMPERATURE,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user },
                ],
            }),
        }
    }

    fn request(&self, body: &serde_json::Value) -> reqwest::RequestBuilder {
        let (url, req) = match self.provider {
            Provider::Anthropic => {
                let url = format!("{}/v1/messages", self.endpoint);
                let mut req = self.client.post(&url);
                if let Some(ref key) = self.api_key {
                    req = req
                        .header("x-api-key", key)
                        .header("anthropic-version", ANTHROPIC_VERSION);
                }
                (url, req)
            }
            Provider::OpenAI | Provider::Ollama => {
                let url = format!("{}/chat/completions", self.endpoint);
                let mut req = self.client.post(&url);
                if let Some(ref key) = self.api_key {
                    req = req.bearer_auth(key);
                }
                (url, req)
            }
        };
        tracing::debug!(%url, model = %self.model, "completion request");
        req.json(body)
    }
}

/// The first text block of a response, per provider shape. Blank text counts
/// as no answer.
fn response_text(provider: Provider, json: serde_json::Value) -> Result<String> {
    let text = match provider {
        Provider::Anthropic => serde_json::from_value::<MessagesResponse>(json)?
            .content
            .into_iter()
            .find_map(|block| block.text),
        Provider::OpenAI | Provider::Ollama => serde_json::from_value::<ChatResponse>(json)?
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content),
    };
    text.filter(|t| !t.trim().is_empty())
        .ok_or(CardsmithError::LlmEmptyResponse)
}

#[async_trait]
impl CompletionService for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = self.request_body(system, user);
        let response = self.request(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CardsmithError::LlmStatus {
                status: status.as_u16(),
                body,
            });
        }

        response_text(self.provider, response.json().await?)
    }
}
