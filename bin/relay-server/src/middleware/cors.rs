use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;

/// Any origin, method and header unless `RELAY_CORS_ORIGINS` narrows the
/// origin list.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let permissive = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    let Some(origins_str) = &config.cors_allowed_origins else {
        return permissive;
    };

    let origins: Vec<axum::http::HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    if origins.is_empty() {
        return permissive;
    }
    CorsLayer::new()
        .allow_origin(origins)
        .allow_headers(Any)
        .allow_methods(Any)
}
