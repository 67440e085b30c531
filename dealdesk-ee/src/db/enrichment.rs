//! Enrichment result persistence
//!
//! One row per (deal, pack); re-runs supersede via single-row upsert.

use crate::models::enrichment::{EnrichmentResult, PackData};
use dealdesk_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Upsert one pack result, superseding any previous run
pub async fn upsert_result(pool: &SqlitePool, result: &EnrichmentResult) -> Result<()> {
    let data = serde_json::to_string(&result.data)
        .map_err(|e| Error::Internal(format!("Failed to serialize pack data: {}", e)))?;
    let sources = serde_json::to_string(&result.sources)
        .map_err(|e| Error::Internal(format!("Failed to serialize sources: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO deal_analysis_sources (deal_id, pack_name, data, sources, confidence, completed_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(deal_id, pack_name) DO UPDATE SET
            data = excluded.data,
            sources = excluded.sources,
            confidence = excluded.confidence,
            completed_at = excluded.completed_at
        "#,
    )
    .bind(result.deal_id.to_string())
    .bind(&result.pack_name)
    .bind(&data)
    .bind(&sources)
    .bind(result.confidence)
    .bind(result.completed_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load one pack's stored result
pub async fn load_result(
    pool: &SqlitePool,
    deal_id: Uuid,
    pack_name: &str,
) -> Result<Option<EnrichmentResult>> {
    let row = sqlx::query(
        r#"
        SELECT deal_id, pack_name, data, sources, confidence, completed_at
        FROM deal_analysis_sources
        WHERE deal_id = ? AND pack_name = ?
        "#,
    )
    .bind(deal_id.to_string())
    .bind(pack_name)
    .fetch_optional(pool)
    .await?;

    row.map(result_from_row).transpose()
}

/// Load all stored pack results for a deal
pub async fn load_results(pool: &SqlitePool, deal_id: Uuid) -> Result<Vec<EnrichmentResult>> {
    let rows = sqlx::query(
        r#"
        SELECT deal_id, pack_name, data, sources, confidence, completed_at
        FROM deal_analysis_sources
        WHERE deal_id = ?
        ORDER BY pack_name
        "#,
    )
    .bind(deal_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(result_from_row).collect()
}

fn result_from_row(row: sqlx::sqlite::SqliteRow) -> Result<EnrichmentResult> {
    let deal_id: String = row.get("deal_id");
    let data: String = row.get("data");
    let sources: String = row.get("sources");
    let completed_at: String = row.get("completed_at");

    let data: PackData = serde_json::from_str(&data)
        .map_err(|e| Error::Internal(format!("Failed to parse pack data: {}", e)))?;
    let sources: Vec<String> = serde_json::from_str(&sources)
        .map_err(|e| Error::Internal(format!("Failed to parse sources: {}", e)))?;

    Ok(EnrichmentResult {
        deal_id: super::deals::parse_uuid(&deal_id, "deal id")?,
        pack_name: row.get("pack_name"),
        data,
        sources,
        confidence: row.get("confidence"),
        completed_at: super::deals::parse_timestamp(&completed_at)?,
    })
}
