//! Server-side web sessions keyed by an opaque cookie token.
//!
//! ARCHITECTURE
//! ============
//! Each session holds a small string attribute map plus the authenticated
//! principal, if any. Handlers never touch the map directly: they go through
//! the `SessionStore` trait held in `AppState`, so tests can swap in a fresh
//! store per case.
//!
//! TRADE-OFFS
//! ==========
//! Every operation takes the lock once and releases it before returning.
//! Two requests writing the same attribute therefore resolve last-write-wins
//! with no further ordering guarantee. Expired sessions are dropped when their
//! id is touched again, and swept in bulk whenever a session is created.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::RwLock;

use crate::identity::OidcUser;

/// Session attribute holding the captured provider `session_state`.
pub const SESSION_STATE_ATTR: &str = "oidc.session_state";

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex session id.
#[must_use]
pub fn generate_session_id() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Storage seam for web sessions.
///
/// Operations on an unknown or expired id behave as if the session does not
/// exist: reads return `None`, writes return `false`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create an empty session and return its id.
    async fn create(&self) -> String;

    /// Whether `id` names a live session. Refreshes its idle timer.
    async fn exists(&self, id: &str) -> bool;

    async fn attribute(&self, id: &str, key: &str) -> Option<String>;

    /// Overwrite `key` on session `id`.
    async fn set_attribute(&self, id: &str, key: &str, value: String) -> bool;

    async fn principal(&self, id: &str) -> Option<OidcUser>;

    async fn set_principal(&self, id: &str, user: OidcUser) -> bool;

    /// Destroy the session. Returns whether it existed.
    async fn remove(&self, id: &str) -> bool;
}

struct SessionRecord {
    attributes: HashMap<String, String>,
    principal: Option<OidcUser>,
    last_seen: Instant,
}

impl SessionRecord {
    fn new() -> Self {
        Self { attributes: HashMap::new(), principal: None, last_seen: Instant::now() }
    }
}

/// In-process session store with idle expiry.
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
    idle_timeout: Duration,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), idle_timeout }
    }

    /// Run `f` against a live session, pruning it first if it has expired.
    async fn with_live<T>(&self, id: &str, f: impl FnOnce(&mut SessionRecord) -> T) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let expired = match sessions.get(id) {
            Some(record) => now.duration_since(record.last_seen) > self.idle_timeout,
            None => return None,
        };
        if expired {
            sessions.remove(id);
            tracing::debug!("expired session pruned");
            return None;
        }
        let record = sessions.get_mut(id)?;
        record.last_seen = now;
        Some(f(record))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self) -> String {
        let id = generate_session_id();
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, record| now.duration_since(record.last_seen) <= self.idle_timeout);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "expired sessions swept");
        }
        sessions.insert(id.clone(), SessionRecord::new());
        id
    }

    async fn exists(&self, id: &str) -> bool {
        self.with_live(id, |_| ()).await.is_some()
    }

    async fn attribute(&self, id: &str, key: &str) -> Option<String> {
        self.with_live(id, |record| record.attributes.get(key).cloned())
            .await
            .flatten()
    }

    async fn set_attribute(&self, id: &str, key: &str, value: String) -> bool {
        self.with_live(id, |record| {
            record.attributes.insert(key.to_owned(), value);
        })
        .await
        .is_some()
    }

    async fn principal(&self, id: &str) -> Option<OidcUser> {
        self.with_live(id, |record| record.principal.clone()).await.flatten()
    }

    async fn set_principal(&self, id: &str, user: OidcUser) -> bool {
        self.with_live(id, |record| record.principal = Some(user))
            .await
            .is_some()
    }

    async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
