//! Ops control switches
//!
//! Runtime kill switches read before expensive operations. A switch that
//! was never set is treated as enabled.

use dealdesk_common::Result;
use sqlx::{Row, SqlitePool};

/// Switch gating enrichment runs
pub const ENRICHMENT_SWITCH: &str = "enrichment_enabled";

/// Check a switch; unset switches default to enabled
pub async fn is_switch_enabled(pool: &SqlitePool, name: &str) -> Result<bool> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT enabled FROM ops_control_switches WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(enabled,)| enabled != 0).unwrap_or(true))
}

/// Set a switch
pub async fn set_switch(pool: &SqlitePool, name: &str, enabled: bool) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO ops_control_switches (name, enabled, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(name) DO UPDATE SET
            enabled = excluded.enabled,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(name)
    .bind(enabled as i64)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// List all explicitly-set switches
pub async fn list_switches(pool: &SqlitePool) -> Result<Vec<(String, bool)>> {
    let rows = sqlx::query("SELECT name, enabled FROM ops_control_switches ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let name: String = row.get("name");
            let enabled: i64 = row.get("enabled");
            (name, enabled != 0)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_switch_defaults_to_enabled() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        dealdesk_common::db::init_tables(&pool).await.unwrap();
        assert!(is_switch_enabled(&pool, ENRICHMENT_SWITCH).await.unwrap());
    }

    #[tokio::test]
    async fn switch_flips_and_lists() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        dealdesk_common::db::init_tables(&pool).await.unwrap();

        set_switch(&pool, ENRICHMENT_SWITCH, false).await.unwrap();
        assert!(!is_switch_enabled(&pool, ENRICHMENT_SWITCH).await.unwrap());

        set_switch(&pool, ENRICHMENT_SWITCH, true).await.unwrap();
        assert!(is_switch_enabled(&pool, ENRICHMENT_SWITCH).await.unwrap());

        let switches = list_switches(&pool).await.unwrap();
        assert_eq!(switches, vec![(ENRICHMENT_SWITCH.to_string(), true)]);
    }
}
