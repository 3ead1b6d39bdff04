//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;

/// Runtime configuration for relay-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind (default: `"0.0.0.0"`).
    pub host: String,

    /// TCP port to bind (default: `5000`, overridable with `PORT`).
    pub port: u16,

    /// Message store URL (default: `"sqlite://realtime_database.db?mode=rwc"`).
    pub database_url: String,

    /// Directory holding `<id>.json` template files.
    pub template_dir: PathBuf,

    /// Maximum accepted body size for `POST /api/savejson`, in bytes.
    pub body_limit: usize,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_api_docs: bool,

    /// `tracing` filter string, e.g. `"info"` or `"debug,sqlx=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 5000,
            database_url: "sqlite://realtime_database.db?mode=rwc".to_owned(),
            template_dir: PathBuf::from("template_json"),
            body_limit: 100 * 1024 * 1024,
            cors_allowed_origins: None,
            enable_api_docs: false,
            log_level: "info".to_owned(),
            log_json: false,
        }
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("RELAY_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            database_url: lookup("RELAY_DATABASE_URL").unwrap_or(defaults.database_url),
            template_dir: lookup("RELAY_TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_dir),
            body_limit: parse_or(&lookup, "RELAY_BODY_LIMIT", defaults.body_limit),
            cors_allowed_origins: lookup("RELAY_CORS_ORIGINS").filter(|s| !s.trim().is_empty()),
            enable_api_docs: flag(&lookup, "RELAY_ENABLE_API_DOCS", defaults.enable_api_docs),
            log_level: lookup("RELAY_LOG").unwrap_or(defaults.log_level),
            log_json: flag(&lookup, "RELAY_LOG_JSON", defaults.log_json),
        }
    }

    /// `host:port` string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    lookup(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
