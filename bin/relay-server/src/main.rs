//! relay-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON or human-readable).
//! 3. Prepare the message store and probe it; an unreachable store is
//!    logged, never fatal.
//! 4. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod entities;
mod error;
mod handlers;
mod middleware;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    init_tracing(&cfg);

    info!(version = env!("CARGO_PKG_VERSION"), "relay-server starting");

    // ── 3. Message store ───────────────────────────────────────────────────────
    let store = SqliteStore::connect_lazy(&cfg.database_url)?;
    match store.probe().await {
        Ok(()) => info!(database_url = %cfg.database_url, "message store ready"),
        Err(e) => error!(
            database_url = %cfg.database_url,
            error = %e,
            "message store unavailable; continuing, requests will retry"
        ),
    }

    // ── 4. HTTP server with graceful shutdown ──────────────────────────────────
    let bind_address = cfg.bind_address();
    let state = Arc::new(AppState::new(cfg, store));
    info!(template_dir = %state.templates.dir().display(), "template store configured");
    let app = routes::build(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("relay-server stopped");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `RELAY_LOG`; an
/// unusable `RELAY_LOG` is reported on stderr and replaced by `info`.
fn init_tracing(cfg: &Config) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| cfg.log_level.parse::<EnvFilter>())
        .unwrap_or_else(|e| {
            eprintln!("relay-server: ignoring RELAY_LOG={:?}: {e}", cfg.log_level);
            EnvFilter::new("info")
        });

    let fmt = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if cfg.log_json {
        fmt.json().init();
    } else {
        fmt.init();
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                warn!(error = %e, "Ctrl-C handler unavailable");
            }
        }
        _ = sigterm => {}
    }

    info!("draining connections before exit");
}
