//! Bounded per-conversation message window

use super::types::{LlmMessage, MessageRole};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Keeps the most recent messages of each conversation.
///
/// Oldest messages fall out first once a conversation holds more than
/// `window` entries.
pub struct ConversationMemory {
    window: usize,
    conversations: Mutex<HashMap<String, VecDeque<LlmMessage>>>,
}

impl ConversationMemory {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            conversations: Mutex::new(HashMap::new()),
        }
    }

    /// Messages of a conversation, oldest first
    pub fn history(&self, conversation_id: &str) -> Vec<LlmMessage> {
        let conversations = self
            .conversations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        conversations
            .get(conversation_id)
            .map(|messages| messages.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Record a completed exchange
    pub fn record_exchange(
        &self,
        conversation_id: &str,
        user: LlmMessage,
        assistant_text: &str,
    ) {
        if self.window == 0 {
            return;
        }
        let mut conversations = self
            .conversations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let messages = conversations
            .entry(conversation_id.to_string())
            .or_default();
        messages.push_back(user);
        messages.push_back(LlmMessage {
            role: MessageRole::Assistant,
            content: assistant_text.to_string(),
            name: None,
        });
        while messages.len() > self.window {
            messages.pop_front();
        }
    }

    /// Drop everything remembered for a conversation
    pub fn clear(&self, conversation_id: &str) {
        let mut conversations = self
            .conversations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        conversations.remove(conversation_id);
    }

    #[cfg(test)]
    fn conversation_count(&self) -> usize {
        self.conversations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}
