//! Per-user interview sessions

mod registry;

pub use registry::{DreamSessionRegistry, SessionHandle};

use crate::dream::Dream;
use crate::state_machine::{ConversationState, Interview};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub type UserId = i64;
pub type ChatId = i64;

/// One user's interview and where to answer it
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    pub chat_id: ChatId,
    /// Name forwarded to the completion backend
    pub display_name: Option<String>,
    pub interview: Interview,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: UserId, chat_id: ChatId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            chat_id,
            display_name: None,
            interview: Interview::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> ConversationState {
        self.interview.state
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user_id: self.user_id,
            chat_id: self.chat_id,
            state: self.interview.state,
            dream: self.interview.dream.clone(),
            awaiting_completion: self.interview.is_busy(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Read-only view of a session for the API
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub state: ConversationState,
    pub dream: Dream,
    pub awaiting_completion: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
