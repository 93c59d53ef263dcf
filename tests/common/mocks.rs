#![allow(clippy::unwrap_used, clippy::expect_used)]
//! In-memory mock collaborators with scriptable failure modes.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use metrifi_gateway::models::page::slugify;
use metrifi_gateway::models::{NewPage, Page};
use metrifi_gateway::store::{
    ContentStore, CustomFieldStore, EDIT_PAGES, FieldKey, IdentityProvider, Principal,
};

/// Identity provider over a fixed set of users.
#[derive(Default)]
pub struct MockIdentityProvider {
    users: Vec<MockUser>,
}

struct MockUser {
    name: String,
    password: String,
    can_edit_pages: bool,
}

impl MockIdentityProvider {
    pub fn with_user(mut self, name: &str, password: &str, can_edit_pages: bool) -> Self {
        self.users.push(MockUser {
            name: name.to_string(),
            password: password.to_string(),
            can_edit_pages,
        });
        self
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn verify(&self, username: &str, password: &str) -> Result<Option<Principal>> {
        let user = self
            .users
            .iter()
            .find(|u| u.name == username && u.password == password);

        Ok(user.map(|u| Principal {
            user_id: Uuid::now_v7(),
            username: u.name.clone(),
            is_admin: false,
            permissions: if u.can_edit_pages {
                vec![EDIT_PAGES.to_string()]
            } else {
                vec![]
            },
        }))
    }
}

/// Content store over an in-memory page map, counting create calls.
#[derive(Default)]
pub struct MockContentStore {
    pages: Mutex<HashMap<Uuid, Page>>,
    create_calls: AtomicUsize,
    fail_create: bool,
}

impl MockContentStore {
    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    /// Number of create calls received, including failed ones.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn create_page(&self, input: NewPage) -> Result<Page> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_create {
            bail!("content store rejected the record");
        }

        let now = Utc::now();
        let page = Page {
            id: Uuid::now_v7(),
            slug: slugify(&input.title),
            title: input.title,
            content: input.content,
            status: input.status,
            page_type: input.page_type,
            created: now,
            changed: now,
        };

        self.pages.lock().unwrap().insert(page.id, page.clone());
        Ok(page)
    }

    async fn find_page(&self, id: Uuid) -> Result<Option<Page>> {
        Ok(self.pages.lock().unwrap().get(&id).cloned())
    }

    fn permalink(&self, page: &Page) -> String {
        format!("https://example.com/{}", page.slug)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Custom-field store over in-memory definition and value maps.
#[derive(Default)]
pub struct MockFieldStore {
    definitions: HashMap<String, String>,
    values: Mutex<HashMap<(Uuid, String), Value>>,
    fail_resolve: bool,
    reject_writes: bool,
}

impl MockFieldStore {
    /// A store that resolves `content_blocks` to a concrete key.
    pub fn with_content_blocks_definition() -> Self {
        Self::default().with_definition("content_blocks", "field_77aa00bb11cc2")
    }

    pub fn with_definition(mut self, field_name: &str, field_key: &str) -> Self {
        self.definitions
            .insert(field_name.to_string(), field_key.to_string());
        self
    }

    pub fn failing_resolution(mut self) -> Self {
        self.fail_resolve = true;
        self
    }

    pub fn rejecting_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    /// Value currently stored under a key for a record.
    pub fn stored(&self, record_id: Uuid, field_key: &str) -> Option<Value> {
        self.values
            .lock()
            .unwrap()
            .get(&(record_id, field_key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl CustomFieldStore for MockFieldStore {
    async fn resolve_key(&self, field_name: &str) -> Result<Option<FieldKey>> {
        if self.fail_resolve {
            bail!("field store unavailable");
        }
        Ok(self
            .definitions
            .get(field_name)
            .map(|k| FieldKey(k.clone())))
    }

    async fn write_field(&self, key: &FieldKey, value: &Value, record_id: Uuid) -> Result<bool> {
        if self.reject_writes {
            return Ok(false);
        }
        self.values
            .lock()
            .unwrap()
            .insert((record_id, key.as_str().to_string()), value.clone());
        Ok(true)
    }

    async fn read_field(&self, key: &FieldKey, record_id: Uuid) -> Result<Option<Value>> {
        Ok(self.stored(record_id, key.as_str()))
    }
}
