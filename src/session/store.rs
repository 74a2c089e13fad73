use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

use super::{SessionId, SessionStore};

const MAX_ENTRIES: u64 = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntryKey {
    session: SessionId,
    namespace: String,
    key: String,
}

impl EntryKey {
    fn new(session: &SessionId, namespace: &str, key: &str) -> Self {
        Self {
            session: session.clone(),
            namespace: namespace.to_string(),
            key: key.to_string(),
        }
    }
}

/// In-process session store.
///
/// Idle expiry is tracked per `(session, namespace, key)` entry, not per
/// session: the remembered form context and a pending-file handle in the same
/// session each expire once *they* have gone unread for `idle_timeout`. A
/// missing pending-file handle reads as an expired download.
#[derive(Clone)]
pub struct MemorySessionStore {
    entries: Cache<EntryKey, String>,
}

impl MemorySessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        let entries = Cache::builder()
            .time_to_idle(idle_timeout)
            .max_capacity(MAX_ENTRIES)
            .build();
        Self { entries }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set(&self, session: &SessionId, namespace: &str, key: &str, value: String) {
        log::debug!("Session {} set {}/{}", session, namespace, key);
        self.entries
            .insert(EntryKey::new(session, namespace, key), value)
            .await;
    }

    async fn get(&self, session: &SessionId, namespace: &str, key: &str) -> Option<String> {
        self.entries.get(&EntryKey::new(session, namespace, key)).await
    }

    async fn remove(&self, session: &SessionId, namespace: &str, key: &str) {
        self.entries
            .invalidate(&EntryKey::new(session, namespace, key))
            .await;
    }
}
