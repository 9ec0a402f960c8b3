pub mod providers;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{CardsmithError, Result};
use providers::{Provider, ResolvedProvider};

/// On-disk representation of auth.json
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct AuthStore {
    #[serde(default)]
    pub default_provider: Option<String>,
    #[serde(default)]
    pub providers: HashMap<String, ProviderCredential>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProviderCredential {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl AuthStore {
    /// Default location: `<config dir>/cardsmith/auth.json`
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CardsmithError::Auth("Could not determine config directory".into()))?;
        Ok(config_dir.join("cardsmith").join("auth.json"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Missing file is an empty store, not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Writes with owner-only permissions on unix.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    pub fn get(&self, provider: Provider) -> Option<&ProviderCredential> {
        self.providers.get(&provider.to_string())
    }

    pub fn set(&mut self, provider: Provider, cred: ProviderCredential) {
        self.providers.insert(provider.to_string(), cred);
    }

    pub fn remove(&mut self, provider: Provider) {
        self.providers.remove(&provider.to_string());
        if self.default_provider.as_deref() == Some(provider.to_string().as_str()) {
            self.default_provider = None;
        }
    }
}

/// Resolve the completion provider:
/// explicit CLI arg > env vars > auth.json default > any stored cred > Ollama fallback
pub fn resolve_provider(
    explicit: Option<&str>,
    env_endpoint: Option<String>,
    env_model: Option<String>,
) -> Result<ResolvedProvider> {
    let store = AuthStore::load()?;
    resolve_with_store(&store, explicit, env_endpoint, env_model)
}

pub fn resolve_with_store(
    store: &AuthStore,
    explicit: Option<&str>,
    env_endpoint: Option<String>,
    env_model: Option<String>,
) -> Result<ResolvedProvider> {
    let provider = if let Some(name) = explicit {
        Provider::from_str_loose(name)
            .ok_or_else(|| CardsmithError::Auth(format!("Unknown provider: {}", name)))?
    } else if let Some(provider) = detect_from_env() {
        provider
    } else if let Some(provider) = store
        .default_provider
        .as_deref()
        .and_then(Provider::from_str_loose)
    {
        provider
    } else {
        [Provider::OpenAI, Provider::Anthropic]
            .into_iter()
            .find(|p| store.get(*p).is_some())
            .unwrap_or(Provider::Ollama)
    };

    resolve_for_provider(provider, store, env_endpoint, env_model)
}

fn resolve_for_provider(
    provider: Provider,
    store: &AuthStore,
    env_endpoint: Option<String>,
    env_model: Option<String>,
) -> Result<ResolvedProvider> {
    let stored = store.get(provider);

    let api_key = if provider.env_var_name().is_empty() {
        None
    } else {
        std::env::var(provider.env_var_name()).ok()
    }
    .or_else(|| stored.map(|c| c.key.clone()));

    let endpoint = env_endpoint
        .or_else(|| stored.and_then(|c| c.endpoint.clone()))
        .unwrap_or_else(|| provider.default_endpoint().to_string());

    let model = env_model
        .or_else(|| stored.and_then(|c| c.model.clone()))
        .unwrap_or_else(|| provider.default_model().to_string());

    if provider.requires_auth() && api_key.is_none() {
        return Err(CardsmithError::Auth(format!(
            "No API key found for {}. Set {} or run: cardsmith auth login --provider {}",
            provider.display_name(),
            provider.env_var_name(),
            provider
        )));
    }

    Ok(ResolvedProvider {
        provider,
        endpoint,
        model,
        api_key,
    })
}

fn detect_from_env() -> Option<Provider> {
    Provider::all()
        .iter()
        .copied()
        .filter(|p| p.requires_auth())
        .find(|p| std::env::var(p.env_var_name()).is_ok())
}
