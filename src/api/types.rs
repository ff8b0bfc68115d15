//! API request and response types

use crate::composer::OutboundMessage;
use crate::session::ChatId;
use serde::{Deserialize, Serialize};

/// Inbound chat text
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Defaults to the user id, as in a private chat
    pub chat_id: Option<ChatId>,
    pub text: String,
    /// Sender's display name, forwarded to the completion backend
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Advance, cancel and start commands
#[derive(Debug, Default, Deserialize)]
pub struct CommandRequest {
    pub chat_id: Option<ChatId>,
}

/// Inline-keyboard button press
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    pub chat_id: Option<ChatId>,
    pub data: String,
}

/// Messages to deliver, in order
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<OutboundMessage>,
}

/// Response for the health check
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub sessions: usize,
    pub model: String,
}

/// Response for model list
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
    pub default: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
