//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - `POST /api/savejson`: template save endpoint
//! - `GET /socket`: realtime channel (WebSocket upgrade)
//! - `GET /api-docs/openapi.json`: only with `RELAY_ENABLE_API_DOCS=true`
//!
//! plus the CORS and per-request trace layers.

pub mod doc;
pub mod socket;
pub mod template;

use std::sync::Arc;

use axum::{Router, middleware};

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(template::router(state.config.body_limit))
        .merge(socket::router());

    if state.config.enable_api_docs {
        app = app.merge(doc::router());
    }

    app
        // Outermost layers execute first on the way in.
        .layer(cors::cors_layer(&state.config))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}
