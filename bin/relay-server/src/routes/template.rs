//! Template save endpoint (`POST /api/savejson`).

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tracing::debug;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::state::AppState;

/// Plain-text body returned on every successful save.
pub const SAVED_MESSAGE: &str = "JSON data saved successfully.";

/// Response header naming the template that was written.
pub static X_TEMPLATE_ID: &str = "x-template-id";

#[derive(OpenApi)]
#[openapi(paths(save_json))]
pub struct TemplateApi;

/// Register the template route with its own body limit.
pub fn router(body_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/savejson", post(save_json))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Save an arbitrary JSON object as a template file.
///
/// With a non-empty `seating_id` the file `<seating_id>.json` is overwritten;
/// otherwise a new 8-character identifier is generated. The identifier that
/// was written is returned in the `x-template-id` header.
#[utoipa::path(
    post,
    path = "/api/savejson",
    tag = "templates",
    request_body(
        content = Value,
        description = "Any JSON object. A non-empty string `seating_id` selects the template to overwrite.",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Template written", body = String),
        (status = 400, description = "Body is not a JSON object, or seating_id is unusable", body = String),
        (status = 413, description = "Body exceeds the configured limit", body = String),
        (status = 500, description = "Template directory or file could not be written", body = String),
    )
)]
pub async fn save_json(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(body) = payload?;
    let saved = state.templates.save(body).await?;
    debug!(path = %saved.path.display(), kind = ?saved.kind, "template saved");
    let id_header = HeaderValue::from_str(saved.id.as_str())
        .map_err(|e| ServerError::Internal(format!("template id is not a valid header: {e}")))?;
    Ok(([(X_TEMPLATE_ID, id_header)], SAVED_MESSAGE).into_response())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
