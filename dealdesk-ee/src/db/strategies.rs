//! Investment strategy (criteria template) persistence
//!
//! The template is stored as one opaque JSON document per fund, exactly as
//! the editor produced it; weight validation happens before save, not here.

use dealdesk_common::criteria::{CriteriaTemplate, TargetParameter};
use dealdesk_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Save a fund's criteria template and target parameters
pub async fn save_strategy(
    pool: &SqlitePool,
    fund_id: Uuid,
    template: &CriteriaTemplate,
    target_parameters: &[TargetParameter],
) -> Result<()> {
    let template_doc = serde_json::to_string(template)
        .map_err(|e| Error::Internal(format!("Failed to serialize template: {}", e)))?;
    let params_doc = serde_json::to_string(target_parameters)
        .map_err(|e| Error::Internal(format!("Failed to serialize target parameters: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO investment_strategies (fund_id, template, target_parameters, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(fund_id) DO UPDATE SET
            template = excluded.template,
            target_parameters = excluded.target_parameters,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(fund_id.to_string())
    .bind(&template_doc)
    .bind(&params_doc)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a fund's criteria template and target parameters
pub async fn load_strategy(
    pool: &SqlitePool,
    fund_id: Uuid,
) -> Result<Option<(CriteriaTemplate, Vec<TargetParameter>)>> {
    let row = sqlx::query(
        "SELECT template, target_parameters FROM investment_strategies WHERE fund_id = ?",
    )
    .bind(fund_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(|r| {
        let template: String = r.get("template");
        let params: String = r.get("target_parameters");
        let template: CriteriaTemplate = serde_json::from_str(&template)
            .map_err(|e| Error::Internal(format!("Failed to parse template: {}", e)))?;
        let params: Vec<TargetParameter> = serde_json::from_str(&params)
            .map_err(|e| Error::Internal(format!("Failed to parse target parameters: {}", e)))?;
        Ok((template, params))
    })
    .transpose()
}
