use std::future::Future;

use chrono::Utc;
use relay_types::{MessageRecord, NewMessage};
use uuid::Uuid;

use crate::entities::SqliteStore;

pub trait MessageStore: Send + Sync + 'static {
    /// Persist a message and return it with its store-assigned id and sequence.
    fn insert_message(
        &self,
        msg: NewMessage,
    ) -> impl Future<Output = Result<MessageRecord, sqlx::Error>> + Send;

    /// Every stored message, oldest first.
    fn list_messages(&self) -> impl Future<Output = Result<Vec<MessageRecord>, sqlx::Error>> + Send;
}

impl MessageStore for SqliteStore {
    async fn insert_message(&self, msg: NewMessage) -> Result<MessageRecord, sqlx::Error> {
        let pool = self.ready().await?;
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO messages (id, username, message, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&id)
        .bind(&msg.username)
        .bind(&msg.message)
        .bind(&created_at)
        .execute(pool)
        .await?;

        Ok(MessageRecord {
            id,
            username: msg.username,
            message: msg.message,
            seq: result.last_insert_rowid(),
        })
    }

    async fn list_messages(&self) -> Result<Vec<MessageRecord>, sqlx::Error> {
        let pool = self.ready().await?;
        let rows: Vec<(i64, String, String, String)> = sqlx::query_as(
            "SELECT seq, id, username, message FROM messages ORDER BY seq ASC",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(seq, id, username, message)| MessageRecord {
                id,
                username,
                message,
                seq,
            })
            .collect())
    }
}
