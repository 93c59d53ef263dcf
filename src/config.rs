//! Configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, bail};

use crate::content::blocks::BlockSanitization;

/// Status assigned to pages at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageStatus {
    /// Pages are created unpublished and require a later editorial step.
    #[default]
    Draft,
    /// Pages go live immediately.
    Publish,
}

impl PageStatus {
    /// Wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Publish => "publish",
        }
    }
}

impl FromStr for PageStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(Self::Draft),
            "publish" => Ok(Self::Publish),
            other => bail!("PAGE_STATUS must be 'draft' or 'publish', got '{other}'"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Public site URL for constructing permalinks.
    pub site_url: String,

    /// Status assigned to newly created pages (default: draft).
    pub page_status: PageStatus,

    /// Sanitization policy applied to flexible-content blocks
    /// (default: recursive).
    pub block_sanitization: BlockSanitization,

    /// Whether the custom-field store's write integration is enabled.
    /// When disabled, submitted content blocks are ignored entirely.
    pub field_writes_enabled: bool,

    /// Optional first-run editor account, created at startup if absent.
    pub bootstrap_editor_user: Option<String>,

    /// Password for the bootstrap editor account.
    pub bootstrap_editor_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let site_url = env::var("SITE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));

        let page_status = env::var("PAGE_STATUS")
            .unwrap_or_else(|_| "draft".to_string())
            .to_lowercase()
            .parse()?;

        let block_sanitization = env::var("BLOCK_SANITIZATION")
            .unwrap_or_else(|_| "recursive".to_string())
            .to_lowercase()
            .parse()?;

        let field_writes_enabled = env::var("FIELD_WRITES_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .context("FIELD_WRITES_ENABLED must be 'true' or 'false'")?;

        let bootstrap_editor_user = env::var("BOOTSTRAP_EDITOR_USER").ok();
        let bootstrap_editor_password = env::var("BOOTSTRAP_EDITOR_PASSWORD").ok();

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            cors_allowed_origins,
            site_url,
            page_status,
            block_sanitization,
            field_writes_enabled,
            bootstrap_editor_user,
            bootstrap_editor_password,
        })
    }
}
