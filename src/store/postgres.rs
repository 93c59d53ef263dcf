//! PostgreSQL-backed collaborator implementations.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::{NewPage, Page, User};

use super::{ContentStore, CustomFieldStore, FieldKey, IdentityProvider, Principal};

/// Identity provider backed by the `users` table with argon2 hashes.
pub struct PgIdentityProvider {
    pool: PgPool,
}

impl PgIdentityProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn verify(&self, username: &str, password: &str) -> Result<Option<Principal>> {
        let Some(user) = User::find_by_name(&self.pool, username).await? else {
            debug!(username, "unknown user");
            return Ok(None);
        };

        if !user.is_active() {
            debug!(username, "inactive account");
            return Ok(None);
        }

        if !user.verify_password(password) {
            debug!(username, "password verification failed");
            return Ok(None);
        }

        Ok(Some(Principal {
            user_id: user.id,
            username: user.name,
            is_admin: user.is_admin,
            permissions: user.permissions,
        }))
    }
}

/// Content store backed by the `pages` table.
pub struct PgContentStore {
    pool: PgPool,
    site_url: String,
}

impl PgContentStore {
    pub fn new(pool: PgPool, site_url: impl Into<String>) -> Self {
        let site_url: String = site_url.into();
        Self {
            // Permalinks are site_url + "/" + slug; strip any trailing slash once
            site_url: site_url.trim_end_matches('/').to_string(),
            pool,
        }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn create_page(&self, input: NewPage) -> Result<Page> {
        Page::create(&self.pool, input).await
    }

    async fn find_page(&self, id: Uuid) -> Result<Option<Page>> {
        Page::find_by_id(&self.pool, id).await
    }

    fn permalink(&self, page: &Page) -> String {
        format!("{}/{}", self.site_url, page.slug)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("database unreachable")?;
        Ok(())
    }
}

/// Custom-field store backed by `field_definitions` and `field_values`.
pub struct PgCustomFieldStore {
    pool: PgPool,
}

impl PgCustomFieldStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomFieldStore for PgCustomFieldStore {
    async fn resolve_key(&self, field_name: &str) -> Result<Option<FieldKey>> {
        let key: Option<(String,)> =
            sqlx::query_as("SELECT field_key FROM field_definitions WHERE field_name = $1")
                .bind(field_name)
                .fetch_optional(&self.pool)
                .await
                .context("failed to resolve field key")?;

        Ok(key.map(|(k,)| FieldKey(k)))
    }

    async fn write_field(&self, key: &FieldKey, value: &Value, record_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO field_values (record_id, field_key, value, updated)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (record_id, field_key)
            DO UPDATE SET value = EXCLUDED.value, updated = NOW()
            "#,
        )
        .bind(record_id)
        .bind(key.as_str())
        .bind(value)
        .execute(&self.pool)
        .await
        .context("failed to write field value")?;

        Ok(result.rows_affected() > 0)
    }

    async fn read_field(&self, key: &FieldKey, record_id: Uuid) -> Result<Option<Value>> {
        let row: Option<(Value,)> = sqlx::query_as(
            "SELECT value FROM field_values WHERE record_id = $1 AND field_key = $2",
        )
        .bind(record_id)
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .context("failed to read field value")?;

        Ok(row.map(|(v,)| v))
    }
}

/// Field definition row: maps a human-readable field name to its
/// stable key.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FieldDefinition {
    pub field_name: String,
    pub field_key: String,
    pub label: String,
}

impl FieldDefinition {
    /// Register or update a field definition.
    pub async fn upsert(
        pool: &PgPool,
        field_name: &str,
        field_key: &str,
        label: &str,
    ) -> Result<Self> {
        let def = sqlx::query_as::<_, FieldDefinition>(
            r#"
            INSERT INTO field_definitions (field_name, field_key, label)
            VALUES ($1, $2, $3)
            ON CONFLICT (field_name)
            DO UPDATE SET field_key = EXCLUDED.field_key, label = EXCLUDED.label
            RETURNING *
            "#,
        )
        .bind(field_name)
        .bind(field_key)
        .bind(label)
        .fetch_one(pool)
        .await
        .context("failed to upsert field definition")?;

        Ok(def)
    }
}
