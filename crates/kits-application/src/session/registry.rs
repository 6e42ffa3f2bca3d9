use super::runtime::SessionHandle;
use kits_core::session::{SessionId, SessionKey};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    by_id: HashMap<SessionId, Arc<SessionHandle>>,
    by_key: HashMap<SessionKey, SessionId>,
}

/// Open sessions, indexed by id and by (subject, page kind).
///
/// At most one session is registered per key; registering a second one
/// hands the displaced session back so the caller can dismiss it.
pub struct SessionRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Gets a session by id.
    pub async fn get(&self, session_id: &SessionId) -> Option<Arc<SessionHandle>> {
        let inner = self.inner.read().await;
        inner.by_id.get(session_id).cloned()
    }

    /// Gets the session currently open for `key`.
    pub async fn get_by_key(&self, key: &SessionKey) -> Option<Arc<SessionHandle>> {
        let inner = self.inner.read().await;
        inner
            .by_key
            .get(key)
            .and_then(|id| inner.by_id.get(id))
            .cloned()
    }

    /// Registers a session, returning the one it displaced, if any.
    pub async fn insert(&self, handle: Arc<SessionHandle>) -> Option<Arc<SessionHandle>> {
        let mut inner = self.inner.write().await;
        let id = handle.id();
        let previous = inner.by_key.insert(handle.key().clone(), id);
        let displaced = match previous {
            Some(old) => inner.by_id.remove(&old),
            None => None,
        };
        inner.by_id.insert(id, handle);
        displaced
    }

    /// Removes a session. The key index is only cleared if it still points
    /// at this session.
    pub async fn remove(&self, session_id: &SessionId) -> Option<Arc<SessionHandle>> {
        let mut inner = self.inner.write().await;
        let handle = inner.by_id.remove(session_id)?;
        if inner.by_key.get(handle.key()) == Some(session_id) {
            inner.by_key.remove(handle.key());
        }
        Some(handle)
    }

    /// Removes and returns every session.
    pub async fn drain(&self) -> Vec<Arc<SessionHandle>> {
        let mut inner = self.inner.write().await;
        inner.by_key.clear();
        inner.by_id.drain().map(|(_, handle)| handle).collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
