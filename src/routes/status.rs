//! Gateway status endpoint.
//!
//! Publicly callable; lets callers confirm the gateway is installed and
//! which version is running.

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Status response.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    message: &'static str,
    version: &'static str,
}

/// Status handler.
///
/// GET /metrifi/v1/status
async fn get_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "active",
        message: "MetriFi gateway is installed and active",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Create the status router.
pub fn router() -> Router<AppState> {
    Router::new().route("/metrifi/v1/status", get(get_status))
}
