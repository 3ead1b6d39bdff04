//! Chat hub: persist-then-broadcast fan-out for the realtime channel.
//!
//! Every connection registers its own unbounded queue on open and removes it
//! on close. [`ChatHub::publish`] writes to the store first and only hands the
//! stored record to each queue once the write succeeded, so a slow client
//! never loses a persisted message.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use relay_types::{MessageRecord, NewMessage};
use tokio::sync::mpsc;

use crate::entities::MessageStore;

/// Receiving half of one connection's feed.
#[derive(Debug)]
pub struct Subscription {
    pub id: u64,
    pub feed: mpsc::UnboundedReceiver<MessageRecord>,
}

#[derive(Debug)]
pub struct ChatHub<S> {
    store: Arc<S>,
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<u64, mpsc::UnboundedSender<MessageRecord>>>,
}

impl<S: MessageStore> ChatHub<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new connection. Records published from now on are queued
    /// for it until [`ChatHub::unsubscribe`] is called.
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, feed) = mpsc::unbounded_channel();
        if let Ok(mut map) = self.subscribers.lock() {
            map.insert(id, tx);
        }
        Subscription { id, feed }
    }

    pub fn unsubscribe(&self, id: u64) {
        if let Ok(mut map) = self.subscribers.lock() {
            map.remove(&id);
        }
    }

    /// Number of registered connections.
    pub fn connections(&self) -> usize {
        self.subscribers.lock().map(|map| map.len()).unwrap_or(0)
    }

    /// Full history, oldest first.
    pub async fn history(&self) -> Result<Vec<MessageRecord>, sqlx::Error> {
        self.store.list_messages().await
    }

    /// Persist `msg` and fan the stored record out to every subscriber.
    ///
    /// Nothing is broadcast when the store write fails.
    pub async fn publish(&self, msg: NewMessage) -> Result<MessageRecord, sqlx::Error> {
        let record = self.store.insert_message(msg).await?;
        if let Ok(mut map) = self.subscribers.lock() {
            // A failed send means the receiver is gone; drop its entry.
            map.retain(|_, tx| tx.send(record.clone()).is_ok());
        }
        Ok(record)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use relay_types::{MessageRecord, NewMessage};

    use crate::entities::MessageStore;

    /// In-memory store with a switch to simulate an outage.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        records: Mutex<Vec<MessageRecord>>,
        offline: AtomicBool,
    }

    impl MemoryStore {
        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        pub fn len(&self) -> usize {
            self.records.lock().map(|r| r.len()).unwrap_or(0)
        }

        fn check(&self) -> Result<(), sqlx::Error> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(sqlx::Error::PoolTimedOut);
            }
            Ok(())
        }
    }

    impl MessageStore for MemoryStore {
        async fn insert_message(&self, msg: NewMessage) -> Result<MessageRecord, sqlx::Error> {
            self.check()?;
            let mut records = self.records.lock().expect("store lock");
            let seq = records.len() as i64 + 1;
            let record = MessageRecord {
                id: format!("msg-{seq}"),
                username: msg.username,
                message: msg.message,
                seq,
            };
            records.push(record.clone());
            Ok(record)
        }

        async fn list_messages(&self) -> Result<Vec<MessageRecord>, sqlx::Error> {
            self.check()?;
            Ok(self.records.lock().expect("store lock").clone())
        }
    }
}

#[cfg(test)]
mod test {
    use super::test_support::MemoryStore;
    use super::*;

    fn new_message(username: &str, message: &str) -> NewMessage {
        NewMessage {
            username: username.into(),
            message: message.into(),
        }
    }

    #[tokio::test]
    async fn publish_reaches_every_subscriber_once() {
        let hub = ChatHub::new(Arc::new(MemoryStore::default()));
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();
        assert_eq!(hub.connections(), 2);

        let stored = hub.publish(new_message("alice", "hi")).await.unwrap();

        assert_eq!(a.feed.recv().await.unwrap(), stored);
        assert_eq!(b.feed.recv().await.unwrap(), stored);
        assert!(a.feed.try_recv().is_err(), "exactly one broadcast per publish");
    }

    #[tokio::test]
    async fn slow_subscriber_misses_nothing() {
        let store = Arc::new(MemoryStore::default());
        let hub = ChatHub::new(Arc::clone(&store));
        let mut slow = hub.subscribe();

        let mut stored = Vec::new();
        for i in 0..2_000 {
            stored.push(hub.publish(new_message("gus", &i.to_string())).await.unwrap());
        }

        let mut received = Vec::new();
        while let Ok(record) = slow.feed.try_recv() {
            received.push(record);
        }
        assert_eq!(store.len(), 2_000);
        assert_eq!(received, stored);
    }

    #[tokio::test]
    async fn unsubscribe_releases_the_connection() {
        let hub = ChatHub::new(Arc::new(MemoryStore::default()));
        let kept = hub.subscribe();
        let gone = hub.subscribe();
        assert_eq!(hub.connections(), 2);

        hub.unsubscribe(gone.id);
        assert_eq!(hub.connections(), 1);
        drop(kept);

        // A dropped receiver is pruned on the next publish.
        hub.publish(new_message("hal", "bye")).await.unwrap();
        assert_eq!(hub.connections(), 0);
    }

    #[tokio::test]
    async fn failed_write_broadcasts_nothing() {
        let store = Arc::new(MemoryStore::default());
        let hub = ChatHub::new(Arc::clone(&store));
        let mut sub = hub.subscribe();

        store.set_offline(true);
        assert!(hub.publish(new_message("alice", "lost")).await.is_err());
        assert!(sub.feed.try_recv().is_err());
        assert_eq!(store.len(), 0);

        store.set_offline(false);
        let stored = hub.publish(new_message("alice", "back")).await.unwrap();
        assert_eq!(sub.feed.recv().await.unwrap(), stored);
    }

    #[tokio::test]
    async fn publish_without_subscribers_still_persists() {
        let store = Arc::new(MemoryStore::default());
        let hub = ChatHub::new(Arc::clone(&store));
        hub.publish(new_message("bob", "anyone?")).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(hub.history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn history_preserves_order() {
        let hub = ChatHub::new(Arc::new(MemoryStore::default()));
        for i in 0..3 {
            hub.publish(new_message("carol", &i.to_string())).await.unwrap();
        }
        let texts: Vec<_> = hub
            .history()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(texts, ["0", "1", "2"]);
    }
}
