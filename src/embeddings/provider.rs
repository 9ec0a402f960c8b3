use async_trait::async_trait;
use serde::Deserialize;

use super::EmbeddingService;
use crate::config::{
    EmbedConfig, DEFAULT_EMBED_ENDPOINT, DEFAULT_EMBED_MODEL, DEFAULT_OLLAMA_EMBED_ENDPOINT,
    DEFAULT_OLLAMA_EMBED_MODEL,
};
use crate::error::{CardsmithError, Result};

pub enum EmbeddingProvider {
    /// Any OpenAI-compatible `/embeddings` endpoint
    OpenAI {
        endpoint: String,
        model: String,
        api_key: String,
        client: reqwest::Client,
    },
    /// Local Ollama server, one request per text
    Ollama {
        endpoint: String,
        model: String,
        client: reqwest::Client,
    },
}

impl EmbeddingProvider {
    /// OpenAI when a key is configured, otherwise Ollama. An explicit
    /// endpoint or model overrides the chosen backend's default.
    pub fn from_config(config: &EmbedConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        let endpoint = |default: &str| {
            config
                .endpoint
                .as_deref()
                .unwrap_or(default)
                .trim_end_matches('/')
                .to_string()
        };
        let model = |default: &str| config.model.clone().unwrap_or_else(|| default.to_string());

        match config.api_key {
            Some(ref key) => Self::OpenAI {
                endpoint: endpoint(DEFAULT_EMBED_ENDPOINT),
                model: model(DEFAULT_EMBED_MODEL),
                api_key: key.clone(),
                client,
            },
            None => Self::Ollama {
                endpoint: endpoint(DEFAULT_OLLAMA_EMBED_ENDPOINT),
                model: model(DEFAULT_OLLAMA_EMBED_MODEL),
                client,
            },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::OpenAI { model, .. } => format!("openai/{}", model),
            Self::Ollama { model, .. } => format!("ollama/{}", model),
        }
    }

    async fn embed_openai(
        client: &reqwest::Client,
        endpoint: &str,
        model: &str,
        api_key: &str,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>> {
        #[derive(Deserialize)]
        struct EmbeddingResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            #[serde(default)]
            index: Option<usize>,
            embedding: Vec<f32>,
        }

        let response = client
            .post(format!("{}/embeddings", endpoint))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&serde_json::json!({
                "model": model,
                "input": texts,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CardsmithError::Embedding(format!(
                "OpenAI API error {}: {}",
                status, text
            )));
        }

        let mut result: EmbeddingResponse = response.json().await?;
        // The API documents `index`; sort on it rather than trusting array order.
        result.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));
        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn embed_ollama(
        client: &reqwest::Client,
        endpoint: &str,
        model: &str,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            let response = client
                .post(format!("{}/api/embeddings", endpoint))
                .json(&serde_json::json!({
                    "model": model,
                    "prompt": text,
                }))
                .send()
                .await?;

            if !response.status().is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(CardsmithError::Embedding(format!(
                    "Ollama API error: {}",
                    text
                )));
            }

            let result: serde_json::Value = response.json().await?;
            let embedding: Vec<f32> = result
                .get("embedding")
                .and_then(|e| e.as_array())
                .ok_or_else(|| {
                    CardsmithError::Embedding("Invalid Ollama embedding response".into())
                })?
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect();

            embeddings.push(embedding);
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingService for EmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            Self::OpenAI {
                endpoint,
                model,
                api_key,
                client,
            } => Self::embed_openai(client, endpoint, model, api_key, texts).await,
            Self::Ollama {
                endpoint,
                model,
                client,
            } => Self::embed_ollama(client, endpoint, model, texts).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_selects_openai() {
        let provider = EmbeddingProvider::from_config(&EmbedConfig {
            endpoint: Some("https://api.openai.com/v1/".into()),
            model: None,
            api_key: Some("sk".into()),
        });
        assert_eq!(provider.describe(), "openai/text-embedding-3-small");
        match provider {
            EmbeddingProvider::OpenAI { endpoint, .. } => {
                assert_eq!(endpoint, "https://api.openai.com/v1")
            }
            EmbeddingProvider::Ollama { .. } => panic!("expected OpenAI"),
        }
    }

    #[test]
    fn no_key_falls_back_to_ollama_defaults() {
        let provider = EmbeddingProvider::from_config(&EmbedConfig::default());
        assert_eq!(provider.describe(), "ollama/nomic-embed-text");
        match provider {
            EmbeddingProvider::Ollama { endpoint, .. } => {
                assert_eq!(endpoint, "http://localhost:11434")
            }
            EmbeddingProvider::OpenAI { .. } => panic!("expected Ollama"),
        }
    }

    #[test]
    fn ollama_honours_configured_endpoint_and_model() {
        let provider = EmbeddingProvider::from_config(&EmbedConfig {
            endpoint: Some("http://gpu-box:11434/".into()),
            model: Some("mxbai-embed-large".into()),
            api_key: None,
        });
        assert_eq!(provider.describe(), "ollama/mxbai-embed-large");
        match provider {
            EmbeddingProvider::Ollama { endpoint, .. } => {
                assert_eq!(endpoint, "http://gpu-box:11434")
            }
            EmbeddingProvider::OpenAI { .. } => panic!("expected Ollama"),
        }
    }

    #[test]
    fn openai_honours_configured_model() {
        let provider = EmbeddingProvider::from_config(&EmbedConfig {
            endpoint: None,
            model: Some("text-embedding-3-large".into()),
            api_key: Some("sk".into()),
        });
        assert_eq!(provider.describe(), "openai/text-embedding-3-large");
    }
}
