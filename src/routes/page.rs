//! Page creation and retrieval handlers.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use uuid::Uuid;

use crate::auth::require_page_editor;
use crate::content::page_service::{CreatePageRequest, PageDetailResponse, PageResponse};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::store::Principal;

/// Create a page from the request payload.
///
/// POST /metrifi/v1/create-page
async fn create_page(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreatePageRequest>,
) -> ApiResult<Json<PageResponse>> {
    tracing::debug!(username = %principal.username, "create-page request");
    let response = state.pages().create_page(request).await?;
    Ok(Json(response))
}

/// Serialize a page with its custom-field data embedded.
///
/// GET /metrifi/v1/page/{id}
async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PageDetailResponse>> {
    let response = state.pages().load_page(id).await?;
    Ok(Json(response))
}

/// Create the page router. The editor gate guards creation only; reads
/// are public.
pub fn router(state: AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route("/metrifi/v1/create-page", post(create_page))
        .layer(middleware::from_fn_with_state(state, require_page_editor));

    Router::new()
        .merge(guarded)
        .route("/metrifi/v1/page/{id}", get(get_page))
}
