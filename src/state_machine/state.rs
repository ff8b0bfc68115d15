//! Interview state types

use crate::dream::{ActorField, Dream};
use serde::Serialize;

/// Stage of the dream interview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationState {
    /// Collecting the dream narrative
    History,
    /// Collecting an association per extracted symbol
    Association,
    /// Collecting a personality trait per character
    Personality,
    /// Where each trait shows up in real life
    Context,
    /// What each trait means to the dreamer
    Sense,
    /// Waiting for the final interpretation
    Interpretation,
    Complete,
    Cancelled,
}

impl ConversationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled)
    }

    /// Actor field collected in this state, for the three actor stages
    pub fn actor_field(self) -> Option<ActorField> {
        match self {
            Self::Personality => Some(ActorField::Characteristic),
            Self::Context => Some(ActorField::Context),
            Self::Sense => Some(ActorField::Sense),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::History => "HISTORY",
            Self::Association => "ASSOCIATION",
            Self::Personality => "PERSONALITY",
            Self::Context => "CONTEXT",
            Self::Sense => "SENSE",
            Self::Interpretation => "INTERPRETATION",
            Self::Complete => "COMPLETE",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an outstanding completion request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPurpose {
    Symbols,
    Actors,
    Interpretation,
}

/// A completion request the session is waiting on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingCompletion {
    pub request_id: String,
    pub purpose: CompletionPurpose,
    /// Symbols from the first extraction call, committed together with the
    /// actors once the second call returns
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<String>,
}

impl PendingCompletion {
    pub fn new(request_id: impl Into<String>, purpose: CompletionPurpose) -> Self {
        Self {
            request_id: request_id.into(),
            purpose,
            symbols: Vec::new(),
        }
    }
}

/// Everything the transition function reads and replaces for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interview {
    pub state: ConversationState,
    pub dream: Dream,
    pub pending: Option<PendingCompletion>,
}

impl Interview {
    pub fn new() -> Self {
        Self {
            state: ConversationState::History,
            dream: Dream::new(),
            pending: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for Interview {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs the transition needs besides state and event
#[derive(Debug, Clone)]
pub struct TransitionContext {
    /// Id to use if this transition starts a completion request
    pub next_request_id: String,
}

impl TransitionContext {
    pub fn new(next_request_id: impl Into<String>) -> Self {
        Self {
            next_request_id: next_request_id.into(),
        }
    }

    pub fn fresh() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}
