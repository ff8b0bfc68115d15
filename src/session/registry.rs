//! Concurrency-safe map from user id to session
//!
//! The map lock is only held to look up or insert handles. Work on a session
//! happens under that session's own mutex, so different users never wait on
//! each other.

use super::{ChatId, Session, SessionSnapshot, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Exclusive access to one session
pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Default)]
pub struct DreamSessionRegistry {
    sessions: RwLock<HashMap<UserId, SessionHandle>>,
}

impl DreamSessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the user's session, creating it if absent.
    /// The flag is true when this call created it.
    pub async fn get_or_create(&self, user_id: UserId, chat_id: ChatId) -> (SessionHandle, bool) {
        // Check if already present
        {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(&user_id) {
                return (Arc::clone(handle), false);
            }
        }

        // Re-check under the write lock; another caller may have won
        let mut sessions = self.sessions.write().await;
        let mut created = false;
        let handle = sessions.entry(user_id).or_insert_with(|| {
            created = true;
            Arc::new(Mutex::new(Session::new(user_id, chat_id)))
        });
        if created {
            tracing::info!(user_id, chat_id, "Created dream session");
        }
        (Arc::clone(handle), created)
    }

    pub async fn get(&self, user_id: UserId) -> Option<SessionHandle> {
        self.sessions.read().await.get(&user_id).cloned()
    }

    pub async fn remove(&self, user_id: UserId) -> Option<SessionHandle> {
        self.sessions.write().await.remove(&user_id)
    }

    /// Remove the user's session only if it is still `handle`.
    /// A session replaced in the meantime is left alone.
    pub async fn remove_if_current(&self, user_id: UserId, handle: &SessionHandle) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&user_id) {
            Some(current) if Arc::ptr_eq(current, handle) => {
                sessions.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    pub async fn snapshot(&self, user_id: UserId) -> Option<SessionSnapshot> {
        let handle = self.get(user_id).await?;
        let session = handle.lock().await;
        Some(session.snapshot())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
