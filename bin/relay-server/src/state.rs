//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::handlers::{ChatHub, TemplateStore};

/// State shared across all HTTP handlers and socket connections.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Realtime fan-out backed by the message store.
    pub hub: Arc<ChatHub<SqliteStore>>,
    /// Template file directory.
    pub templates: Arc<TemplateStore>,
}

impl AppState {
    pub fn new(config: Config, store: SqliteStore) -> Self {
        let hub = ChatHub::new(Arc::new(store));
        let templates = TemplateStore::new(config.template_dir.clone());
        Self {
            config: Arc::new(config),
            hub: Arc::new(hub),
            templates: Arc::new(templates),
        }
    }
}
