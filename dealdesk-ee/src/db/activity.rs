//! Activity event log
//!
//! Append-only record of explicit user actions (enrich, analyze, template
//! save) for the dashboard activity feed.

use dealdesk_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Append one activity event
pub async fn record_activity(
    pool: &SqlitePool,
    deal_id: Option<Uuid>,
    fund_id: Option<Uuid>,
    action: &str,
    detail: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO activity_events (deal_id, fund_id, action, detail, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(deal_id.map(|id| id.to_string()))
    .bind(fund_id.map(|id| id.to_string()))
    .bind(action)
    .bind(detail)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_append() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        dealdesk_common::db::init_tables(&pool).await.unwrap();

        let deal_id = Uuid::new_v4();
        record_activity(&pool, Some(deal_id), None, "enrichment_run", "5 packs").await.unwrap();
        record_activity(&pool, Some(deal_id), None, "analysis_run", "").await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_events")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }
}
