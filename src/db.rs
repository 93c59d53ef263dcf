//! Database connection pool and schema management.

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

/// Idempotent schema, applied at startup.
///
/// PostgreSQL doesn't allow multiple statements in a single prepared
/// statement, so the schema is kept as discrete statements and executed
/// one at a time.
const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        pass TEXT NOT NULL,
        status SMALLINT NOT NULL DEFAULT 1,
        is_admin BOOLEAN NOT NULL DEFAULT FALSE,
        permissions TEXT[] NOT NULL DEFAULT '{}',
        created TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pages (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL DEFAULT 'draft',
        page_type TEXT NOT NULL DEFAULT 'page',
        slug TEXT NOT NULL UNIQUE,
        created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        changed TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS field_definitions (
        field_name TEXT PRIMARY KEY,
        field_key TEXT NOT NULL UNIQUE,
        label TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS field_values (
        record_id UUID NOT NULL,
        field_key TEXT NOT NULL,
        value JSONB NOT NULL,
        updated TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (record_id, field_key)
    )
    "#,
];

/// Create a PostgreSQL connection pool.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    Ok(pool)
}

/// Apply the schema.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("failed to apply schema statement")?;
    }

    Ok(())
}
