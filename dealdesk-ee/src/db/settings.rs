//! Settings database operations
//!
//! Key-value accessors over the settings table. API keys stored here take
//! priority over environment variables and TOML config at resolution time.

use dealdesk_common::{Error, Result};
use sqlx::SqlitePool;

/// Get OpenAI API key from database
pub async fn get_openai_api_key(pool: &SqlitePool) -> Result<Option<String>> {
    get_setting(pool, "openai_api_key").await
}

/// Set OpenAI API key in database
pub async fn set_openai_api_key(pool: &SqlitePool, key: String) -> Result<()> {
    set_setting(pool, "openai_api_key", key).await
}

/// Get Perplexity API key from database
pub async fn get_perplexity_api_key(pool: &SqlitePool) -> Result<Option<String>> {
    get_setting(pool, "perplexity_api_key").await
}

/// Set Perplexity API key in database
pub async fn set_perplexity_api_key(pool: &SqlitePool, key: String) -> Result<()> {
    set_setting(pool, "perplexity_api_key", key).await
}

/// Get Google Search API key from database
pub async fn get_google_search_api_key(pool: &SqlitePool) -> Result<Option<String>> {
    get_setting(pool, "google_search_api_key").await
}

/// Get Google Search engine ID from database
pub async fn get_google_search_engine_id(pool: &SqlitePool) -> Result<Option<String>> {
    get_setting(pool, "google_search_engine_id").await
}

/// Generic setting getter (internal)
async fn get_setting<T>(pool: &SqlitePool, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)?;

    match row {
        Some((value,)) => {
            let parsed = value
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Parse setting failed: {}", e)))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Generic setting setter (internal)
async fn set_setting<T>(pool: &SqlitePool, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(pool)
    .await
    .map_err(Error::Database)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        dealdesk_common::db::init_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let pool = setup_pool().await;
        assert_eq!(get_openai_api_key(&pool).await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let pool = setup_pool().await;
        set_openai_api_key(&pool, "sk-abc".to_string()).await.unwrap();
        assert_eq!(get_openai_api_key(&pool).await.unwrap(), Some("sk-abc".to_string()));
    }

    #[tokio::test]
    async fn set_twice_updates_in_place() {
        let pool = setup_pool().await;
        set_perplexity_api_key(&pool, "old".to_string()).await.unwrap();
        set_perplexity_api_key(&pool, "new".to_string()).await.unwrap();

        assert_eq!(get_perplexity_api_key(&pool).await.unwrap(), Some("new".to_string()));

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM settings WHERE key = 'perplexity_api_key'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }
}
