//! Session-scoped key/value storage.
//!
//! Values are partitioned by session id and namespace. Request handlers never
//! touch the store directly; they get a [`SessionScope`] bound to the caller's
//! session, so one session can never read another session's entries.

mod store;


pub use store::MemorySessionStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn set(&self, session: &SessionId, namespace: &str, key: &str, value: String);
    async fn get(&self, session: &SessionId, namespace: &str, key: &str) -> Option<String>;
    async fn remove(&self, session: &SessionId, namespace: &str, key: &str);
}

/// Handle to one session's entries.
#[derive(Clone)]
pub struct SessionScope {
    id: SessionId,
    store: Arc<dyn SessionStore>,
}

impl SessionScope {
    pub fn new(id: SessionId, store: Arc<dyn SessionStore>) -> Self {
        Self { id, store }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub async fn set(&self, namespace: &str, key: &str, value: String) {
        self.store.set(&self.id, namespace, key, value).await
    }

    pub async fn get(&self, namespace: &str, key: &str) -> Option<String> {
        self.store.get(&self.id, namespace, key).await
    }

    pub async fn remove(&self, namespace: &str, key: &str) {
        self.store.remove(&self.id, namespace, key).await
    }

    /// Read and clear an entry in one go, for flash-style values.
    pub async fn take(&self, namespace: &str, key: &str) -> Option<String> {
        let value = self.get(namespace, key).await;
        if value.is_some() {
            self.remove(namespace, key).await;
        }
        value
    }
}
