// src/session/registry.rs

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::machine::TestSession;

/// Grace past the nominal deadline before the server force-completes a
/// session, covering client latency on the final submit.
const EXPIRY_GRACE_SECS: u64 = 30;

struct ActiveSession {
    session: TestSession,
    expiry: JoinHandle<()>,
}

/// In-memory registry of live test sessions.
///
/// Sessions are ephemeral: an attempt does not survive a server restart, and
/// the client submits the full result anyway. Each insert arms exactly one
/// expiry task whose handle is stored alongside the session and aborted
/// whenever the session leaves the map, so no timer outlives its session.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<Uuid, ActiveSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a running session and arm its expiry timer.
    pub async fn insert(&self, session: TestSession) {
        let id = session.id();
        let ttl = session.remaining_seconds(Utc::now()) as u64 + EXPIRY_GRACE_SECS;

        let registry = self.clone();
        let expiry = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(ttl)).await;
            registry.expire(id).await;
        });

        self.inner
            .lock()
            .await
            .insert(id, ActiveSession { session, expiry });
    }

    /// Run `f` against a live session, if present.
    pub async fn with_session<T>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut TestSession) -> T,
    ) -> Option<T> {
        let mut map = self.inner.lock().await;
        map.get_mut(id).map(|active| f(&mut active.session))
    }

    /// Remove a session, cancelling its expiry timer.
    pub async fn remove(&self, id: &Uuid) -> Option<TestSession> {
        let active = self.inner.lock().await.remove(id)?;
        active.expiry.abort();
        Some(active.session)
    }

    /// Timer-driven exit: force-complete and evict. The result is only
    /// logged here; the client still owns result submission and its copy of
    /// the answers is the one that gets persisted.
    async fn expire(&self, id: Uuid) {
        if let Some(active) = self.inner.lock().await.remove(&id) {
            let mut session = active.session;
            let result = session.expire(Utc::now());
            tracing::info!(
                session = %id,
                user_id = result.user_id,
                score = result.final_score_percent,
                "test session expired before the client completed it"
            );
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
