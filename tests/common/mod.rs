#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]
//! Common test infrastructure: a router over mock collaborators.

pub mod mocks;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use tower::ServiceExt;

use metrifi_gateway::config::{Config, PageStatus};
use metrifi_gateway::content::BlockSanitization;
use metrifi_gateway::routes;
use metrifi_gateway::state::AppState;

use self::mocks::{MockContentStore, MockFieldStore, MockIdentityProvider};

/// Editor account with the edit-pages capability.
pub const EDITOR: (&str, &str) = ("metrifi", "app-password");

/// Reader account without the edit-pages capability.
pub const READER: (&str, &str) = ("reader", "reader-password");

/// Test application over mock collaborators.
pub struct TestApp {
    pub router: Router,
    pub content: Arc<MockContentStore>,
    pub fields: Arc<MockFieldStore>,
}

/// Config used by tests: recursive sanitization, drafts, field writes on.
pub fn test_config() -> Config {
    Config {
        port: 0,
        database_url: String::new(),
        database_max_connections: 1,
        cors_allowed_origins: vec!["*".to_string()],
        site_url: "https://example.com".to_string(),
        page_status: PageStatus::Draft,
        block_sanitization: BlockSanitization::Recursive,
        field_writes_enabled: true,
        bootstrap_editor_user: None,
        bootstrap_editor_password: None,
    }
}

/// Build a test app with the default mock collaborators.
pub fn test_app() -> TestApp {
    test_app_with(
        test_config(),
        MockContentStore::default(),
        MockFieldStore::with_content_blocks_definition(),
    )
}

/// Build a test app from explicit mocks.
pub fn test_app_with(config: Config, content: MockContentStore, fields: MockFieldStore) -> TestApp {
    let identity = MockIdentityProvider::default()
        .with_user(EDITOR.0, EDITOR.1, true)
        .with_user(READER.0, READER.1, false);

    let content = Arc::new(content);
    let fields = Arc::new(fields);

    let state = AppState::with_stores(
        &config,
        Arc::new(identity),
        content.clone(),
        fields.clone(),
    );

    TestApp {
        router: routes::app(&config, state),
        content,
        fields,
    }
}

/// Encode a Basic credential header value.
pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{username}:{password}")))
}

/// Issue a JSON request against the router and decode the response.
pub async fn json_request(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    auth: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }

    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let request = builder.body(body).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();

    let json: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
