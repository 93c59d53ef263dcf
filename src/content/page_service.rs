//! Page creation service.
//!
//! Orchestrates the create-page flow: request validation, sanitization of
//! plain content, record creation through the content store, flexible-content
//! block persistence through the custom-field store, and read-after-write
//! assembly of the response. Field-store failures after the record exists are
//! logged and swallowed; the page is already created and the request still
//! succeeds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{Config, PageStatus};
use crate::error::{ApiError, ApiResult};
use crate::models::NewPage;
use crate::store::{ContentStore, CustomFieldStore, FieldKey};

use super::blocks::{BlockSanitization, sanitize_blocks};
use super::filter::{sanitize_html, sanitize_plain_text};

/// Field name under which flexible-content blocks are stored.
pub const CONTENT_BLOCKS_FIELD: &str = "content_blocks";

/// Key used when the field store cannot resolve [`CONTENT_BLOCKS_FIELD`].
pub const CONTENT_BLOCKS_FALLBACK_KEY: &str = "field_5b92ba6a9b055";

/// Request body for page creation.
///
/// `title` is optional at the wire level so that a missing title surfaces
/// as a 400 with a stable error code instead of a deserializer rejection.
#[derive(Debug, Deserialize)]
pub struct CreatePageRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub acf: Option<AcfPayload>,
}

/// Custom-field portion of the request body.
#[derive(Debug, Deserialize)]
pub struct AcfPayload {
    pub content_blocks: Option<Vec<Value>>,
}

/// Custom-field portion of responses. `content_blocks` is whatever the
/// field store returned on read-back, or null when nothing is stored.
#[derive(Debug, Serialize)]
pub struct AcfFields {
    pub content_blocks: Value,
}

/// Response for a created page.
#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub id: Uuid,
    pub title: String,
    pub acf: AcfFields,
    pub link: String,
}

/// Full page serialization with embedded custom-field data.
#[derive(Debug, Serialize)]
pub struct PageDetailResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub page_type: String,
    pub title: String,
    pub status: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub changed: DateTime<Utc>,
    pub acf: AcfFields,
    pub link: String,
}

/// Service for page creation and retrieval.
#[derive(Clone)]
pub struct PageService {
    inner: Arc<PageServiceInner>,
}

struct PageServiceInner {
    content: Arc<dyn ContentStore>,
    fields: Arc<dyn CustomFieldStore>,
    page_status: PageStatus,
    sanitization: BlockSanitization,
    field_writes_enabled: bool,
}

impl PageService {
    /// Create a new page service.
    pub fn new(
        config: &Config,
        content: Arc<dyn ContentStore>,
        fields: Arc<dyn CustomFieldStore>,
    ) -> Self {
        Self {
            inner: Arc::new(PageServiceInner {
                content,
                fields,
                page_status: config.page_status,
                sanitization: config.block_sanitization,
                field_writes_enabled: config.field_writes_enabled,
            }),
        }
    }

    /// Create a page from a validated request.
    pub async fn create_page(&self, request: CreatePageRequest) -> ApiResult<PageResponse> {
        let title = request.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return Err(ApiError::InvalidParam("Title is required.".to_string()));
        }

        let input = NewPage {
            title: sanitize_plain_text(title),
            content: request
                .content
                .as_deref()
                .map(sanitize_html)
                .unwrap_or_default(),
            status: self.inner.page_status.as_str().to_string(),
            page_type: "page".to_string(),
        };

        let page = match self.inner.content.create_page(input).await {
            Ok(page) => page,
            Err(e) => {
                error!(error = %e, "page creation failed");
                return Err(ApiError::PostCreationFailed);
            }
        };

        info!(page_id = %page.id, title = %page.title, "page created");

        let field_key = self.resolve_field_key(CONTENT_BLOCKS_FIELD).await;

        let blocks = request
            .acf
            .and_then(|acf| acf.content_blocks)
            .unwrap_or_default();

        if !blocks.is_empty() && self.inner.field_writes_enabled {
            let sanitized = sanitize_blocks(&blocks, self.inner.sanitization);
            let value = Value::Array(sanitized);

            // Persist failures are non-fatal: the page exists, so the
            // request still succeeds and the echo reflects read-back state.
            match self
                .inner
                .fields
                .write_field(&field_key, &value, page.id)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    warn!(page_id = %page.id, field_key = %field_key, "field store did not apply content_blocks write");
                }
                Err(e) => {
                    warn!(error = %e, page_id = %page.id, field_key = %field_key, "failed to persist content_blocks");
                }
            }
        }

        let content_blocks = self.read_field_echo(&field_key, page.id).await;
        let link = self.inner.content.permalink(&page);

        Ok(PageResponse {
            id: page.id,
            title: page.title,
            acf: AcfFields { content_blocks },
            link,
        })
    }

    /// Load a page with its custom-field data embedded.
    pub async fn load_page(&self, id: Uuid) -> ApiResult<PageDetailResponse> {
        let page = self
            .inner
            .content
            .find_page(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("page {id}")))?;

        let field_key = self.resolve_field_key(CONTENT_BLOCKS_FIELD).await;
        let content_blocks = self.read_field_echo(&field_key, page.id).await;
        let link = self.inner.content.permalink(&page);

        Ok(PageDetailResponse {
            id: page.id,
            page_type: page.page_type,
            title: page.title,
            status: page.status,
            content: page.content,
            created: page.created,
            changed: page.changed,
            acf: AcfFields { content_blocks },
            link,
        })
    }

    /// Resolve the stable key for a field name, falling back to
    /// [`CONTENT_BLOCKS_FALLBACK_KEY`] when the store has no answer.
    /// Never fails.
    async fn resolve_field_key(&self, field_name: &str) -> FieldKey {
        match self.inner.fields.resolve_key(field_name).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                warn!(
                    field = field_name,
                    fallback = CONTENT_BLOCKS_FALLBACK_KEY,
                    "no field definition found, using fallback key"
                );
                FieldKey(CONTENT_BLOCKS_FALLBACK_KEY.to_string())
            }
            Err(e) => {
                warn!(
                    error = %e,
                    field = field_name,
                    fallback = CONTENT_BLOCKS_FALLBACK_KEY,
                    "field key lookup failed, using fallback key"
                );
                FieldKey(CONTENT_BLOCKS_FALLBACK_KEY.to_string())
            }
        }
    }

    /// Read-after-write echo of a field value. Read failures degrade to
    /// null rather than failing the request.
    async fn read_field_echo(&self, key: &FieldKey, record_id: Uuid) -> Value {
        match self.inner.fields.read_field(key, record_id).await {
            Ok(Some(value)) => value,
            Ok(None) => Value::Null,
            Err(e) => {
                warn!(error = %e, record_id = %record_id, "failed to read back field value");
                Value::Null
            }
        }
    }
}
