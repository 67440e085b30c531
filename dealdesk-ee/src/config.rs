//! Configuration resolution for dealdesk-ee
//!
//! API keys resolve with Database → ENV → TOML priority: operators can
//! rotate keys through the settings endpoint without redeploying, while
//! fresh installs work from environment variables alone. A provider whose
//! key cannot be resolved is a startup configuration error, not a degraded
//! runtime mode.

use dealdesk_common::config::TomlConfig;
use dealdesk_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Resolved provider credentials
#[derive(Debug, Clone)]
pub struct ProviderKeys {
    pub openai_api_key: String,
    pub perplexity_api_key: String,
    /// Google Custom Search is optional; packs run without supplementary
    /// search when unset
    pub google_search: Option<GoogleSearchKeys>,
}

#[derive(Debug, Clone)]
pub struct GoogleSearchKeys {
    pub api_key: String,
    pub engine_id: String,
}

/// Resolve all provider keys at startup
pub async fn resolve_provider_keys(pool: &SqlitePool, toml: &TomlConfig) -> Result<ProviderKeys> {
    let openai_api_key = resolve_key(
        "OpenAI",
        crate::db::settings::get_openai_api_key(pool).await?,
        std::env::var("OPENAI_API_KEY").ok(),
        toml.openai_api_key.clone(),
    )?;

    let perplexity_api_key = resolve_key(
        "Perplexity",
        crate::db::settings::get_perplexity_api_key(pool).await?,
        std::env::var("PERPLEXITY_API_KEY").ok(),
        toml.perplexity_api_key.clone(),
    )?;

    let google_api_key = resolve_optional_key(
        crate::db::settings::get_google_search_api_key(pool).await?,
        std::env::var("GOOGLE_SEARCH_API_KEY").ok(),
        toml.google_search_api_key.clone(),
    );
    let google_engine_id = resolve_optional_key(
        crate::db::settings::get_google_search_engine_id(pool).await?,
        std::env::var("GOOGLE_SEARCH_ENGINE_ID").ok(),
        toml.google_search_engine_id.clone(),
    );

    let google_search = match (google_api_key, google_engine_id) {
        (Some(api_key), Some(engine_id)) => Some(GoogleSearchKeys { api_key, engine_id }),
        (None, None) => {
            info!("Google Custom Search not configured; packs will skip supplementary search");
            None
        }
        _ => {
            warn!("Google Custom Search partially configured (key or engine id missing); disabled");
            None
        }
    };

    Ok(ProviderKeys { openai_api_key, perplexity_api_key, google_search })
}

/// Resolve one required key with Database → ENV → TOML priority
fn resolve_key(
    provider: &str,
    db_key: Option<String>,
    env_key: Option<String>,
    toml_key: Option<String>,
) -> Result<String> {
    let mut sources = Vec::new();
    if db_key.as_deref().is_some_and(is_valid_key) {
        sources.push("database");
    }
    if env_key.as_deref().is_some_and(is_valid_key) {
        sources.push("environment");
    }
    if toml_key.as_deref().is_some_and(is_valid_key) {
        sources.push("TOML");
    }

    if sources.len() > 1 {
        warn!(
            "{} API key found in multiple sources: {}. Using {} (highest priority).",
            provider,
            sources.join(", "),
            sources[0]
        );
    }

    for (key, source) in [(db_key, "database"), (env_key, "environment"), (toml_key, "TOML")] {
        if let Some(key) = key {
            if is_valid_key(&key) {
                info!("{} API key loaded from {}", provider, source);
                return Ok(key);
            }
        }
    }

    Err(Error::Config(format!(
        "{} API key not configured. Set it via the settings endpoint, the {}_API_KEY \
         environment variable, or the TOML config file.",
        provider,
        provider.to_uppercase()
    )))
}

fn resolve_optional_key(
    db_key: Option<String>,
    env_key: Option<String>,
    toml_key: Option<String>,
) -> Option<String> {
    [db_key, env_key, toml_key]
        .into_iter()
        .flatten()
        .find(|k| is_valid_key(k))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_key_wins_over_env_and_toml() {
        let key = resolve_key(
            "OpenAI",
            Some("from-db".to_string()),
            Some("from-env".to_string()),
            Some("from-toml".to_string()),
        )
        .unwrap();
        assert_eq!(key, "from-db");
    }

    #[test]
    fn env_key_wins_when_database_is_blank() {
        let key = resolve_key(
            "OpenAI",
            Some("   ".to_string()),
            Some("from-env".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let result = resolve_key("Perplexity", None, None, None);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn blank_keys_are_invalid() {
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("  \t"));
        assert!(is_valid_key("sk-x"));
    }

    #[tokio::test]
    async fn partially_configured_google_search_is_disabled() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        dealdesk_common::db::init_tables(&pool).await.unwrap();
        crate::db::settings::set_openai_api_key(&pool, "sk-a".to_string()).await.unwrap();
        crate::db::settings::set_perplexity_api_key(&pool, "pplx-a".to_string()).await.unwrap();
        sqlx::query("INSERT INTO settings (key, value) VALUES ('google_search_api_key', 'g-key')")
            .execute(&pool)
            .await
            .unwrap();

        let keys = resolve_provider_keys(&pool, &TomlConfig::default()).await.unwrap();
        assert!(keys.google_search.is_none(), "engine id missing disables search");
    }
}
