//! Provider cost tracking
//!
//! Token usage per provider per enrichment run, for spend dashboards.

use dealdesk_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Record one provider call's token usage
pub async fn record_cost(
    pool: &SqlitePool,
    deal_id: Uuid,
    provider: &str,
    prompt_tokens: u64,
    completion_tokens: u64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO analysis_cost_tracking (deal_id, provider, prompt_tokens, completion_tokens, recorded_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(deal_id.to_string())
    .bind(provider)
    .bind(prompt_tokens as i64)
    .bind(completion_tokens as i64)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Total tokens recorded for a deal, across providers
pub async fn total_tokens(pool: &SqlitePool, deal_id: Uuid) -> Result<i64> {
    let total: Option<i64> = sqlx::query_scalar(
        "SELECT SUM(prompt_tokens + completion_tokens) FROM analysis_cost_tracking WHERE deal_id = ?",
    )
    .bind(deal_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(total.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn costs_accumulate_per_deal() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        dealdesk_common::db::init_tables(&pool).await.unwrap();

        let deal_id = Uuid::new_v4();
        record_cost(&pool, deal_id, "perplexity", 100, 400).await.unwrap();
        record_cost(&pool, deal_id, "openai", 250, 150).await.unwrap();

        assert_eq!(total_tokens(&pool, deal_id).await.unwrap(), 900);
        assert_eq!(total_tokens(&pool, Uuid::new_v4()).await.unwrap(), 0);
    }
}
