use colored::Colorize;

use cardsmith::auth::providers::Provider;
use cardsmith::auth::{self, AuthStore, ProviderCredential};
use cardsmith::error::{CardsmithError, Result};

fn parse_provider(name: &str) -> Result<Provider> {
    Provider::from_str_loose(name).ok_or_else(|| {
        CardsmithError::Auth(format!(
            "Unknown provider: {}. Use: openai, anthropic, ollama",
            name
        ))
    })
}

pub fn cmd_auth_login(provider_name: Option<String>, set_default: bool) -> Result<()> {
    use dialoguer::{Password, Select};

    let provider = match provider_name {
        Some(name) => parse_provider(&name)?,
        None => {
            let items: Vec<&str> = Provider::all().iter().map(|p| p.display_name()).collect();
            let selection = Select::new()
                .with_prompt("Select LLM provider")
                .items(&items)
                .default(0)
                .interact()
                .map_err(|e| CardsmithError::Auth(format!("Selection cancelled: {}", e)))?;
            Provider::all()[selection]
        }
    };

    let mut store = AuthStore::load()?;

    if provider.requires_auth() {
        let key = Password::new()
            .with_prompt(format!("Enter {} API key", provider.display_name()))
            .interact()
            .map_err(|e| CardsmithError::Auth(format!("Input cancelled: {}", e)))?;

        if key.trim().is_empty() {
            return Err(CardsmithError::Auth("API key cannot be empty".into()));
        }

        store.set(
            provider,
            ProviderCredential {
                key: key.trim().to_string(),
                endpoint: None,
                model: None,
            },
        );
    } else {
        println!(
            "{} {} does not require authentication.",
            "Note:".cyan(),
            provider.display_name()
        );
    }

    if set_default || store.default_provider.is_none() {
        store.default_provider = Some(provider.to_string());
    }
    store.save()?;

    println!(
        "{} Configured {}.",
        "Done!".green().bold(),
        provider.display_name()
    );
    if store.default_provider.as_deref() == Some(provider.to_string().as_str()) {
        println!("  Set as default provider.");
    }
    Ok(())
}

pub fn cmd_auth_list() -> Result<()> {
    let store = AuthStore::load()?;

    println!("{}", "Configured Providers".green().bold());
    println!("{}", "=".repeat(50));

    for &provider in Provider::all() {
        let from_env = !provider.env_var_name().is_empty()
            && std::env::var(provider.env_var_name()).is_ok();
        let is_default = store.default_provider.as_deref() == Some(provider.to_string().as_str());

        let status = if from_env {
            "env var".green().to_string()
        } else if store.get(provider).is_some() {
            "auth.json".cyan().to_string()
        } else if !provider.requires_auth() {
            "no auth needed".dimmed().to_string()
        } else {
            "not configured".dimmed().to_string()
        };

        println!(
            "  {}{}\t{}",
            provider.display_name().cyan().bold(),
            if is_default { " (default)" } else { "" },
            status
        );
    }
    Ok(())
}

pub fn cmd_auth_logout(provider_name: &str) -> Result<()> {
    let provider = parse_provider(provider_name)?;

    let mut store = AuthStore::load()?;
    store.remove(provider);
    store.save()?;

    println!(
        "{} Removed credentials for {}.",
        "Done!".green().bold(),
        provider.display_name()
    );
    Ok(())
}

pub fn cmd_auth_status() -> Result<()> {
    let env_endpoint = std::env::var("CARDSMITH_LLM_ENDPOINT").ok();
    let env_model = std::env::var("CARDSMITH_LLM_MODEL").ok();

    match auth::resolve_provider(None, env_endpoint, env_model) {
        Ok(resolved) => {
            println!("{}", "Active LLM Provider".green().bold());
            println!("{}", "=".repeat(40));
            println!("  Provider:  {}", resolved.provider.display_name().cyan());
            println!("  Model:     {}", resolved.model);
            println!("  Endpoint:  {}", resolved.endpoint);
            if let Some(ref key) = resolved.api_key {
                println!("  API Key:   {}", mask_key(key));
            }
        }
        Err(CardsmithError::Auth(msg)) => {
            println!("{} {}", "Note:".yellow(), msg);
            println!("  Run 'cardsmith auth login' to configure a provider.");
        }
        Err(e) => {
            println!("{} Failed to resolve provider: {}", "Error:".red(), e);
        }
    }
    Ok(())
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "****".to_string()
    }
}
