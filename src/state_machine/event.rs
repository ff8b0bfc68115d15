//! Events that can occur in an interview

use crate::llm::LlmError;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserText {
        text: String,
    },
    /// Explicit request to move to the next stage
    Advance,
    Cancel,

    // Gateway events
    CompletionSucceeded {
        request_id: String,
        text: String,
    },
    CompletionFailed {
        request_id: String,
        error: LlmError,
    },
}

impl Event {
    pub fn user_text(text: impl Into<String>) -> Self {
        Event::UserText { text: text.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::UserText { .. } => "user_text",
            Event::Advance => "advance",
            Event::Cancel => "cancel",
            Event::CompletionSucceeded { .. } => "completion_succeeded",
            Event::CompletionFailed { .. } => "completion_failed",
        }
    }
}
