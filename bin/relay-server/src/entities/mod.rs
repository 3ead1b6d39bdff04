//! Message store gateway.
//!
//! [`MessageStore`] defines the interface for persisting chat messages. The
//! default implementation is [`SqliteStore`]. To swap to another database,
//! implement [`MessageStore`] for your new type and change the concrete type
//! in [`crate::state::AppState`].
//!
//! The pool is opened lazily: constructing a [`SqliteStore`] never touches
//! the database, and the schema is applied on first successful use. A store
//! that is unreachable at startup therefore recovers on its own once it
//! comes back, without restarting the process.

pub mod message;

pub use message::MessageStore;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::sync::OnceCell;

#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
    schema: OnceCell<()>,
}

impl SqliteStore {
    /// Prepare a pool for `url` without connecting.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://realtime_database.db?mode=rwc"`. Only a malformed URL is an
    /// error here; connection problems surface on first use.
    pub fn connect_lazy(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?;
        let pool = SqlitePoolOptions::new().connect_lazy_with(options);
        Ok(Self {
            pool,
            schema: OnceCell::new(),
        })
    }

    /// Connect (if needed) and make sure pending migrations are applied.
    ///
    /// A failed attempt leaves the cell empty, so the next call retries.
    pub async fn ready(&self) -> Result<&SqlitePool, sqlx::Error> {
        self.schema
            .get_or_try_init(|| async {
                // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
                sqlx::migrate!("./migrations").run(&self.pool).await?;
                Ok::<(), sqlx::Error>(())
            })
            .await?;
        Ok(&self.pool)
    }

    /// Startup probe used only for logging whether the store is reachable.
    pub async fn probe(&self) -> Result<(), sqlx::Error> {
        self.ready().await.map(|_| ())
    }
}
