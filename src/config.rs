use crate::auth;
use crate::auth::providers::ResolvedProvider;
use crate::error::{CardsmithError, Result};

/// Cosine similarity above which two texts count as duplicates
pub const SIMILARITY_THRESHOLD: f32 = 0.75;
/// Words per segment sent to the extractor
pub const DEFAULT_CHUNK_SIZE_WORDS: usize = 1500;
/// Words shared between consecutive segments
pub const DEFAULT_OVERLAP_WORDS: usize = 200;
/// Upper bound on in-flight completion/store requests within one run
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
/// Default embedding model
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBED_ENDPOINT: &str = "https://api.openai.com/v1";
/// Used when no embedding API key is configured
pub const DEFAULT_OLLAMA_EMBED_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_OLLAMA_EMBED_ENDPOINT: &str = "http://localhost:11434";

/// How surviving candidates are grouped before merge resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ClusterMode {
    /// Members must be similar to the cluster's seed (first) candidate.
    #[default]
    Seed,
    /// Transitive closure of the similarity relation.
    Connected,
}

/// Tuning knobs for one generation run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub chunk_size_words: usize,
    pub overlap_words: usize,
    pub similarity_threshold: f32,
    pub cluster_mode: ClusterMode,
    pub max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size_words: DEFAULT_CHUNK_SIZE_WORDS,
            overlap_words: DEFAULT_OVERLAP_WORDS,
            similarity_threshold: SIMILARITY_THRESHOLD,
            cluster_mode: ClusterMode::Seed,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Card store connection details
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Embedding service connection details. Unset endpoint and model fall back
/// to the defaults of whichever backend the API key selects.
#[derive(Debug, Clone, Default)]
pub struct EmbedConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub llm: ResolvedProvider,
    pub embed: EmbedConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    pub fn load(provider_override: Option<&str>) -> Result<Self> {
        let store = StoreConfig::from_env()?;

        let env_endpoint = env_any(&["CARDSMITH_LLM_ENDPOINT"]);
        let env_model = env_any(&["CARDSMITH_LLM_MODEL"]);
        let llm = auth::resolve_provider(provider_override, env_endpoint, env_model)?;

        Ok(Config {
            store,
            llm,
            embed: EmbedConfig::from_env(),
            pipeline: PipelineConfig::default(),
        })
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self> {
        let base_url = env_any(&["CARDSMITH_STORE_URL", "FSRS_API_URL"]).ok_or_else(|| {
            CardsmithError::Config(
                "Card store URL not set. Export CARDSMITH_STORE_URL (or FSRS_API_URL)".into(),
            )
        })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: env_any(&["CARDSMITH_STORE_API_KEY", "FSRS_API_KEY"]),
        })
    }
}

impl EmbedConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: env_any(&["CARDSMITH_EMBED_ENDPOINT"]),
            model: env_any(&["CARDSMITH_EMBED_MODEL"]),
            api_key: env_any(&["CARDSMITH_EMBED_API_KEY", "OPENAI_API_KEY"]),
        }
    }
}

/// First non-empty value among the given variables.
fn env_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|n| std::env::var(n).ok())
        .find(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_defaults_match_documented_values() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.chunk_size_words, 1500);
        assert_eq!(cfg.overlap_words, 200);
        assert_eq!(cfg.similarity_threshold, 0.75);
        assert_eq!(cfg.cluster_mode, ClusterMode::Seed);
        assert!(cfg.max_concurrency >= 1);
    }

    #[test]
    fn env_any_skips_unset_and_blank() {
        std::env::set_var("CARDSMITH_TEST_BLANK", "  ");
        std::env::set_var("CARDSMITH_TEST_SET", "value");
        assert_eq!(
            env_any(&[
                "CARDSMITH_TEST_UNSET_XYZ",
                "CARDSMITH_TEST_BLANK",
                "CARDSMITH_TEST_SET"
            ]),
            Some("value".to_string())
        );
        assert_eq!(env_any(&["CARDSMITH_TEST_UNSET_XYZ"]), None);
    }
}
