use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::routes::template::TemplateApi;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(info(
    title = "relay-server",
    description = "relay-server HTTP API. The realtime channel lives at `GET /socket` (WebSocket)."
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(TemplateApi::openapi());
    root
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(get_docs()) }),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn docs_list_the_save_endpoint() {
        let docs = get_docs();
        assert!(docs.paths.paths.contains_key("/api/savejson"));
    }
}
