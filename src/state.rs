//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::content::PageService;
use crate::content::page_service::{CONTENT_BLOCKS_FALLBACK_KEY, CONTENT_BLOCKS_FIELD};
use crate::db;
use crate::models::User;
use crate::models::user::CreateUser;
use crate::store::postgres::{
    FieldDefinition, PgContentStore, PgCustomFieldStore, PgIdentityProvider,
};
use crate::store::{ContentStore, EDIT_PAGES, IdentityProvider};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Identity provider consulted by the auth gate.
    identity: Arc<dyn IdentityProvider>,

    /// Content store, kept for liveness probes.
    content: Arc<dyn ContentStore>,

    /// Page creation service.
    pages: PageService,
}

impl AppState {
    /// Initialize state against PostgreSQL: connect, apply the schema,
    /// seed the canonical field definition, and optionally provision a
    /// first-run editor account.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config).await?;

        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;

        // The canonical definition for the flexible-content field. Its key
        // matches the resolver's fallback so records written during a
        // definition outage stay addressable.
        FieldDefinition::upsert(
            &pool,
            CONTENT_BLOCKS_FIELD,
            CONTENT_BLOCKS_FALLBACK_KEY,
            "Content Blocks",
        )
        .await
        .context("failed to seed field definition")?;

        if let (Some(name), Some(password)) = (
            config.bootstrap_editor_user.as_deref(),
            config.bootstrap_editor_password.as_deref(),
        ) {
            if User::find_by_name(&pool, name).await?.is_none() {
                User::create(
                    &pool,
                    CreateUser {
                        name: name.to_string(),
                        password: password.to_string(),
                        is_admin: false,
                        permissions: vec![EDIT_PAGES.to_string()],
                    },
                )
                .await
                .context("failed to create bootstrap editor")?;
                info!(username = name, "bootstrap editor account created");
            }
        }

        let identity: Arc<dyn IdentityProvider> = Arc::new(PgIdentityProvider::new(pool.clone()));
        let content: Arc<dyn ContentStore> =
            Arc::new(PgContentStore::new(pool.clone(), config.site_url.clone()));
        let fields = Arc::new(PgCustomFieldStore::new(pool));

        Ok(Self::with_stores(config, identity, content, fields))
    }

    /// Assemble state from explicit collaborator implementations.
    pub fn with_stores(
        config: &Config,
        identity: Arc<dyn IdentityProvider>,
        content: Arc<dyn ContentStore>,
        fields: Arc<dyn crate::store::CustomFieldStore>,
    ) -> Self {
        let pages = PageService::new(config, content.clone(), fields);

        Self {
            inner: Arc::new(AppStateInner {
                identity,
                content,
                pages,
            }),
        }
    }

    /// Identity provider handle.
    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.inner.identity
    }

    /// Page service handle.
    pub fn pages(&self) -> &PageService {
        &self.inner.pages
    }

    /// Content store liveness.
    pub async fn content_healthy(&self) -> bool {
        self.inner.content.health_check().await.is_ok()
    }
}
