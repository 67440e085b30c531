//! Database access for DealDesk services
//!
//! All services share one SQLite database in the root folder. Schema is
//! created on first connection; columns holding structured documents store
//! serialized JSON, ids store hyphenated UUID text, timestamps store RFC3339.

pub mod models;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool, creating the file and schema if missing
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create all DealDesk tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS funds (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            fund_type TEXT NOT NULL,
            focus_industries TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS deals (
            id TEXT PRIMARY KEY,
            fund_id TEXT NOT NULL,
            name TEXT NOT NULL,
            industry TEXT NOT NULL,
            stage TEXT NOT NULL DEFAULT '',
            geography TEXT NOT NULL DEFAULT '',
            description TEXT,
            website TEXT,
            financials TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One criteria template document per fund, stored opaque
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS investment_strategies (
            fund_id TEXT PRIMARY KEY,
            template TEXT NOT NULL,
            target_parameters TEXT NOT NULL DEFAULT '[]',
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Per-pack enrichment output, superseded (not versioned) on re-run
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS deal_analysis_sources (
            deal_id TEXT NOT NULL,
            pack_name TEXT NOT NULL,
            data TEXT NOT NULL,
            sources TEXT NOT NULL DEFAULT '[]',
            confidence REAL NOT NULL,
            completed_at TEXT NOT NULL,
            PRIMARY KEY (deal_id, pack_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS deal_analysis_results (
            deal_id TEXT PRIMARY KEY,
            result TEXT NOT NULL,
            overall_score REAL NOT NULL,
            generated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ic_memos (
            deal_id TEXT PRIMARY KEY,
            memo TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Audit trail of memo snapshots, append-only
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ic_memo_versions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deal_id TEXT NOT NULL,
            memo TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS activity_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deal_id TEXT,
            fund_id TEXT,
            action TEXT NOT NULL,
            detail TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ops_control_switches (
            name TEXT PRIMARY KEY,
            enabled INTEGER NOT NULL DEFAULT 1,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analysis_cost_tracking (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deal_id TEXT NOT NULL,
            provider TEXT NOT NULL,
            prompt_tokens INTEGER NOT NULL DEFAULT 0,
            completion_tokens INTEGER NOT NULL DEFAULT 0,
            recorded_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized");

    Ok(())
}
