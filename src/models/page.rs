//! Page model and CRUD operations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Page record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Page {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: String,
    pub page_type: String,
    pub slug: String,
    pub created: DateTime<Utc>,
    pub changed: DateTime<Utc>,
}

/// Input for creating a page. Title and content are expected to be
/// sanitized before they reach this layer.
#[derive(Debug, Clone)]
pub struct NewPage {
    pub title: String,
    pub content: String,
    pub status: String,
    pub page_type: String,
}

impl Page {
    /// Create a new page with a unique slug derived from the title.
    pub async fn create(pool: &PgPool, input: NewPage) -> Result<Self> {
        let id = Uuid::now_v7();
        let slug = generate_unique_slug(pool, &input.title).await?;

        let page = sqlx::query_as::<_, Page>(
            r#"
            INSERT INTO pages (id, title, content, status, page_type, slug)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.status)
        .bind(&input.page_type)
        .bind(&slug)
        .fetch_one(pool)
        .await
        .context("failed to create page")?;

        Ok(page)
    }

    /// Find a page by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let page = sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch page by id")?;

        Ok(page)
    }
}

/// Convert text into a URL-safe slug.
///
/// Transforms to lowercase, replaces non-alphanumeric characters with
/// hyphens, collapses consecutive hyphens, and trims both ends.
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_hyphen = true; // Start true to skip leading hyphens
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_was_hyphen = false;
        } else if !prev_was_hyphen {
            result.push('-');
            prev_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.len() > 128 {
        let truncated = &result[..128];
        if let Some(last_hyphen) = truncated.rfind('-') {
            return truncated[..last_hyphen].to_string();
        }
        return truncated.to_string();
    }

    result
}

/// Generate a unique slug for a new page, handling duplicates with
/// numeric suffixes. If `my-page` is taken, tries `my-page-1`,
/// `my-page-2`, etc. Uses a single prefix query rather than sequential
/// lookups.
async fn generate_unique_slug(pool: &PgPool, title: &str) -> Result<String> {
    let base = match slugify(title) {
        s if s.is_empty() => "page".to_string(),
        s => s,
    };

    // Escape LIKE wildcards in the base before building the pattern
    let escaped_base = base
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let like_pattern = format!("{escaped_base}%");
    let existing: Vec<(String,)> =
        sqlx::query_as("SELECT slug FROM pages WHERE slug LIKE $1 LIMIT 200")
            .bind(&like_pattern)
            .fetch_all(pool)
            .await
            .context("failed to check slug uniqueness")?;

    let existing_set: std::collections::HashSet<&str> =
        existing.iter().map(|(s,)| s.as_str()).collect();

    if !existing_set.contains(base.as_str()) {
        return Ok(base);
    }

    for i in 1..100 {
        let candidate = format!("{base}-{i}");
        if !existing_set.contains(candidate.as_str()) {
            return Ok(candidate);
        }
    }

    // Fallback: append UUID fragment for guaranteed uniqueness
    let fragment = &Uuid::now_v7().simple().to_string()[..8];
    Ok(format!("{base}-{fragment}"))
}
