//! Deal and fund row operations

use dealdesk_common::db::models::{Deal, Fund};
use dealdesk_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Load a deal by id
pub async fn get_deal(pool: &SqlitePool, deal_id: Uuid) -> Result<Option<Deal>> {
    let row = sqlx::query(
        r#"
        SELECT id, fund_id, name, industry, stage, geography,
               description, website, financials, created_at
        FROM deals
        WHERE id = ?
        "#,
    )
    .bind(deal_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(deal_from_row).transpose()
}

/// Load a fund by id
pub async fn get_fund(pool: &SqlitePool, fund_id: Uuid) -> Result<Option<Fund>> {
    let row = sqlx::query(
        "SELECT id, name, fund_type, focus_industries, created_at FROM funds WHERE id = ?",
    )
    .bind(fund_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(fund_from_row).transpose()
}

/// Insert a deal (ids are caller-assigned)
pub async fn insert_deal(pool: &SqlitePool, deal: &Deal) -> Result<()> {
    let financials = deal
        .financials
        .as_ref()
        .map(|v| serde_json::to_string(v))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to serialize financials: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO deals (id, fund_id, name, industry, stage, geography,
                           description, website, financials, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(deal.id.to_string())
    .bind(deal.fund_id.to_string())
    .bind(&deal.name)
    .bind(&deal.industry)
    .bind(&deal.stage)
    .bind(&deal.geography)
    .bind(&deal.description)
    .bind(&deal.website)
    .bind(financials)
    .bind(deal.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert a fund (ids are caller-assigned)
pub async fn insert_fund(pool: &SqlitePool, fund: &Fund) -> Result<()> {
    let focus = serde_json::to_string(&fund.focus_industries)
        .map_err(|e| Error::Internal(format!("Failed to serialize focus industries: {}", e)))?;

    sqlx::query(
        "INSERT INTO funds (id, name, fund_type, focus_industries, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(fund.id.to_string())
    .bind(&fund.name)
    .bind(fund.fund_type.as_str())
    .bind(focus)
    .bind(fund.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

fn deal_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Deal> {
    let id: String = row.get("id");
    let fund_id: String = row.get("fund_id");
    let financials: Option<String> = row.get("financials");
    let created_at: String = row.get("created_at");

    Ok(Deal {
        id: parse_uuid(&id, "deal id")?,
        fund_id: parse_uuid(&fund_id, "fund id")?,
        name: row.get("name"),
        industry: row.get("industry"),
        stage: row.get("stage"),
        geography: row.get("geography"),
        description: row.get("description"),
        website: row.get("website"),
        financials: financials
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| Error::Internal(format!("Failed to parse financials: {}", e)))?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn fund_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Fund> {
    let id: String = row.get("id");
    let fund_type: String = row.get("fund_type");
    let focus: String = row.get("focus_industries");
    let created_at: String = row.get("created_at");

    Ok(Fund {
        id: parse_uuid(&id, "fund id")?,
        name: row.get("name"),
        fund_type: fund_type
            .parse()
            .map_err(|e: String| Error::Internal(format!("Failed to parse fund type: {}", e)))?,
        focus_industries: serde_json::from_str(&focus)
            .map_err(|e| Error::Internal(format!("Failed to parse focus industries: {}", e)))?,
        created_at: parse_timestamp(&created_at)?,
    })
}

pub(crate) fn parse_uuid(s: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("Failed to parse {}: {}", what, e)))
}

pub(crate) fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse timestamp: {}", e)))
}
