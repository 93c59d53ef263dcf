//! Collaborator interfaces.
//!
//! The gateway talks to three external systems: an identity provider, a
//! content store, and a custom-field store. Each is a trait so the HTTP
//! layer stays independent of any particular backend; the shipped
//! implementations live in [`postgres`].

pub mod postgres;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::models::{NewPage, Page};

/// Permission required to create pages through the gateway.
pub const EDIT_PAGES: &str = "edit pages";

/// An authenticated caller. Transient: exists only for the duration of
/// one request's authorization check.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub permissions: Vec<String>,
}

impl Principal {
    /// Whether this principal may create and edit pages.
    pub fn can_edit_pages(&self) -> bool {
        self.is_admin || self.permissions.iter().any(|p| p == EDIT_PAGES)
    }
}

/// Stable store-internal identifier for a named custom field, distinct
/// from its human-readable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKey(pub String);

impl FieldKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Verifies username/secret pairs and reports caller capabilities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a credential pair. `Ok(None)` means the credentials were
    /// rejected; `Err` means the provider itself failed.
    async fn verify(&self, username: &str, password: &str) -> Result<Option<Principal>>;
}

/// Durably creates page records and resolves their canonical links.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Create a page record, returning the stored row.
    async fn create_page(&self, input: NewPage) -> Result<Page>;

    /// Load a page by its identifier.
    async fn find_page(&self, id: Uuid) -> Result<Option<Page>>;

    /// Canonical public link for a page.
    fn permalink(&self, page: &Page) -> String;

    /// Liveness probe for the backing store.
    async fn health_check(&self) -> Result<()>;
}

/// Maps field names to stable keys and persists structured field values
/// against records.
#[async_trait]
pub trait CustomFieldStore: Send + Sync {
    /// Resolve a human-readable field name to its stable key.
    /// `Ok(None)` means no definition exists for the name.
    async fn resolve_key(&self, field_name: &str) -> Result<Option<FieldKey>>;

    /// Persist a field value against a record. `Ok(false)` means the
    /// store reported the write was not applied.
    async fn write_field(&self, key: &FieldKey, value: &Value, record_id: Uuid) -> Result<bool>;

    /// Read a field value back by its resolved key.
    async fn read_field(&self, key: &FieldKey, record_id: Uuid) -> Result<Option<Value>>;
}
