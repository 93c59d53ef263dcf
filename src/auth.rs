//! Basic-credential authentication gate.
//!
//! Wired only to the create-page route. Extracts `Authorization: Basic`
//! credentials, verifies them against the identity provider, and lets the
//! request through only when the resulting principal may edit pages. The
//! verified [`Principal`] is inserted into request extensions for handlers.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::state::AppState;

/// A decoded username/secret pair from a Basic credential header.
#[derive(Debug, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

/// Reasons a credential header failed to parse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("authorization scheme is not Basic")]
    NotBasic,
    #[error("credential payload is not valid base64")]
    BadEncoding,
    #[error("credential payload is not valid UTF-8")]
    BadUtf8,
    #[error("credential payload has no colon separator")]
    MissingSeparator,
}

impl BasicCredentials {
    /// Parse an `Authorization` header value of the form
    /// `Basic <base64(username:password)>`. The scheme is matched
    /// case-insensitively; the payload splits on the first colon so
    /// passwords may themselves contain colons.
    pub fn parse(header: &str) -> Result<Self, CredentialError> {
        let (scheme, payload) = header
            .trim()
            .split_once(' ')
            .ok_or(CredentialError::NotBasic)?;

        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(CredentialError::NotBasic);
        }

        let decoded = BASE64
            .decode(payload.trim())
            .map_err(|_| CredentialError::BadEncoding)?;

        let decoded = String::from_utf8(decoded).map_err(|_| CredentialError::BadUtf8)?;

        let (username, password) = decoded
            .split_once(':')
            .ok_or(CredentialError::MissingSeparator)?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Middleware guarding page creation.
///
/// - No `Authorization` header, or one that cannot be parsed as a Basic
///   credential → 401.
/// - Credentials rejected by the identity provider, provider failure, or
///   a principal without the edit-pages capability → 403.
/// - Otherwise the principal is attached to the request and it proceeds.
pub async fn require_page_editor(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(auth_header) = auth_header else {
        return ApiError::Unauthenticated("Authentication required.".to_string()).into_response();
    };

    let credentials = match BasicCredentials::parse(auth_header) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "unparseable credential header");
            return ApiError::Unauthenticated("Authentication required.".to_string())
                .into_response();
        }
    };

    let principal = match state
        .identity()
        .verify(&credentials.username, &credentials.password)
        .await
    {
        Ok(Some(principal)) => principal,
        Ok(None) => {
            debug!(username = %credentials.username, "credentials rejected");
            return forbidden();
        }
        Err(e) => {
            error!(error = %e, "identity provider failure");
            return forbidden();
        }
    };

    if !principal.can_edit_pages() {
        debug!(username = %principal.username, "principal lacks edit-pages capability");
        return forbidden();
    }

    request.extensions_mut().insert(principal);
    next.run(request).await
}

fn forbidden() -> Response {
    ApiError::Forbidden("You do not have permission to create pages.".to_string()).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn encode(payload: &str) -> String {
        format!("Basic {}", BASE64.encode(payload))
    }

    #[test]
    fn parses_valid_credentials() {
        let creds = BasicCredentials::parse(&encode("metrifi:app-password")).unwrap();
        assert_eq!(creds.username, "metrifi");
        assert_eq!(creds.password, "app-password");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let header = format!("basic {}", BASE64.encode("u:p"));
        assert!(BasicCredentials::parse(&header).is_ok());
    }

    #[test]
    fn password_may_contain_colons() {
        let creds = BasicCredentials::parse(&encode("u:pa:ss:word")).unwrap();
        assert_eq!(creds.username, "u");
        assert_eq!(creds.password, "pa:ss:word");
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(
            BasicCredentials::parse("Bearer abc123"),
            Err(CredentialError::NotBasic)
        );
        assert_eq!(
            BasicCredentials::parse("abc123"),
            Err(CredentialError::NotBasic)
        );
    }

    #[test]
    fn rejects_bad_base64() {
        assert_eq!(
            BasicCredentials::parse("Basic ###not-base64###"),
            Err(CredentialError::BadEncoding)
        );
    }

    #[test]
    fn rejects_payload_without_colon() {
        let header = format!("Basic {}", BASE64.encode("no-separator"));
        assert_eq!(
            BasicCredentials::parse(&header),
            Err(CredentialError::MissingSeparator)
        );
    }

    #[test]
    fn rejects_non_utf8_payload() {
        let header = format!("Basic {}", BASE64.encode([0xff, 0xfe, b':', b'x']));
        assert_eq!(
            BasicCredentials::parse(&header),
            Err(CredentialError::BadUtf8)
        );
    }

    #[test]
    fn empty_username_and_password_still_parse() {
        let creds = BasicCredentials::parse(&encode(":")).unwrap();
        assert_eq!(creds.username, "");
        assert_eq!(creds.password, "");
    }
}
