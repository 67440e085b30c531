//! Analysis result and IC memo persistence
//!
//! Latest analysis/memo live in single-row-per-deal tables; every memo save
//! also appends an immutable snapshot to the version table for audit.

use crate::models::analysis::{AnalysisResult, IcMemo};
use dealdesk_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Upsert the latest analysis for a deal
pub async fn save_analysis(pool: &SqlitePool, analysis: &AnalysisResult) -> Result<()> {
    let result = serde_json::to_string(analysis)
        .map_err(|e| Error::Internal(format!("Failed to serialize analysis: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO deal_analysis_results (deal_id, result, overall_score, generated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(deal_id) DO UPDATE SET
            result = excluded.result,
            overall_score = excluded.overall_score,
            generated_at = excluded.generated_at
        "#,
    )
    .bind(analysis.deal_id.to_string())
    .bind(&result)
    .bind(analysis.overall_score)
    .bind(analysis.generated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the latest analysis for a deal
pub async fn load_analysis(pool: &SqlitePool, deal_id: Uuid) -> Result<Option<AnalysisResult>> {
    let row = sqlx::query("SELECT result FROM deal_analysis_results WHERE deal_id = ?")
        .bind(deal_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(|r| {
        let result: String = r.get("result");
        serde_json::from_str(&result)
            .map_err(|e| Error::Internal(format!("Failed to parse analysis: {}", e)))
    })
    .transpose()
}

/// Upsert the latest memo and append a version snapshot
pub async fn save_memo(pool: &SqlitePool, memo: &IcMemo) -> Result<()> {
    let document = serde_json::to_string(memo)
        .map_err(|e| Error::Internal(format!("Failed to serialize memo: {}", e)))?;
    let now = memo.updated_at.to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO ic_memos (deal_id, memo, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(deal_id) DO UPDATE SET
            memo = excluded.memo,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(memo.deal_id.to_string())
    .bind(&document)
    .bind(&now)
    .execute(pool)
    .await?;

    sqlx::query("INSERT INTO ic_memo_versions (deal_id, memo, created_at) VALUES (?, ?, ?)")
        .bind(memo.deal_id.to_string())
        .bind(&document)
        .bind(&now)
        .execute(pool)
        .await?;

    Ok(())
}

/// Load the latest memo for a deal
pub async fn load_memo(pool: &SqlitePool, deal_id: Uuid) -> Result<Option<IcMemo>> {
    let row = sqlx::query("SELECT memo FROM ic_memos WHERE deal_id = ?")
        .bind(deal_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(|r| {
        let memo: String = r.get("memo");
        serde_json::from_str(&memo)
            .map_err(|e| Error::Internal(format!("Failed to parse memo: {}", e)))
    })
    .transpose()
}

/// Count stored memo versions for a deal
pub async fn count_memo_versions(pool: &SqlitePool, deal_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ic_memo_versions WHERE deal_id = ?")
        .bind(deal_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(count)
}
