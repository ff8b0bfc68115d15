//! Dream interview engine
//!
//! Entry points for the surrounding handling layer. Each call locates (or
//! creates) the user's session, feeds one event through the state machine,
//! runs the resulting gateway calls and returns the messages to deliver.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionExecutor;

use crate::composer::{CallbackAction, OutboundMessage, ResponseComposer};
use crate::llm::{LlmService, ModelRegistry, UnconfiguredService};
use crate::session::{ChatId, DreamSessionRegistry, SessionHandle, UserId};
use crate::state_machine::{on_enter, ConversationState, Effect, Event, TransitionContext};
use std::sync::Arc;

pub struct DreamEngine {
    sessions: DreamSessionRegistry,
    executor: SessionExecutor,
    composer: ResponseComposer,
}

impl DreamEngine {
    pub fn new(gateway: Arc<dyn LlmService>) -> Self {
        let composer = ResponseComposer::new();
        Self {
            sessions: DreamSessionRegistry::new(),
            executor: SessionExecutor::new(gateway, composer),
            composer,
        }
    }

    /// Engine backed by the registry's default model
    pub fn from_registry(registry: &ModelRegistry) -> Self {
        let gateway = registry.default().unwrap_or_else(|| {
            tracing::warn!(
                model = %registry.default_model_id(),
                "Default model unavailable, completions will fail"
            );
            Arc::new(UnconfiguredService::new(registry.default_model_id()))
        });
        Self::new(gateway)
    }

    pub fn sessions(&self) -> &DreamSessionRegistry {
        &self.sessions
    }

    pub fn model_id(&self) -> &str {
        self.executor.model_id()
    }

    pub async fn handle_inbound_text(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        text: &str,
    ) -> Vec<OutboundMessage> {
        self.handle_inbound_text_from(user_id, chat_id, text, None)
            .await
    }

    /// Inbound text with the sender's display name, forwarded to the backend
    pub async fn handle_inbound_text_from(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        text: &str,
        display_name: Option<&str>,
    ) -> Vec<OutboundMessage> {
        self.dispatch(user_id, chat_id, Event::user_text(text), display_name)
            .await
    }

    pub async fn handle_advance_command(
        &self,
        user_id: UserId,
        chat_id: ChatId,
    ) -> Vec<OutboundMessage> {
        self.dispatch(user_id, chat_id, Event::Advance, None).await
    }

    /// Cancel the user's interview. Without a session there is nothing to stop.
    pub async fn handle_cancel_command(
        &self,
        user_id: UserId,
        chat_id: ChatId,
    ) -> Vec<OutboundMessage> {
        let Some(handle) = self.sessions.get(user_id).await else {
            tracing::debug!(user_id, chat_id, "Cancel without a session");
            return vec![];
        };
        handle.lock().await.chat_id = chat_id;
        let outbound = self.executor.run(&handle, Event::Cancel).await;
        self.evict_if_finished(user_id, &handle).await;
        outbound
    }

    /// Discard any interview in progress and start over
    pub async fn handle_start_command(
        &self,
        user_id: UserId,
        chat_id: ChatId,
    ) -> Vec<OutboundMessage> {
        if let Some(previous) = self.sessions.remove(user_id).await {
            let mut previous = previous.lock().await;
            // Orphan any in-flight completion of the old session
            SessionExecutor::apply(&mut previous, Event::Cancel);
            self.executor.forget_chat(previous.chat_id);
            tracing::info!(user_id, state = %previous.state(), "Replaced dream session");
        }
        let (handle, _) = self.sessions.get_or_create(user_id, chat_id).await;
        let mut session = handle.lock().await;
        session.chat_id = chat_id;

        let (_, effects) = on_enter(
            session.state(),
            &session.interview.dream,
            &TransitionContext::fresh(),
        );
        let mut outbound = vec![self.composer.greeting(chat_id)];
        outbound.extend(
            self.composer
                .render_all(chat_id, effects.iter().filter_map(Effect::as_reply)),
        );
        outbound
    }

    /// Dispatch an inline-keyboard payload
    pub async fn handle_callback(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        data: &str,
    ) -> Vec<OutboundMessage> {
        match CallbackAction::parse(data) {
            Some(CallbackAction::Next) => self.handle_advance_command(user_id, chat_id).await,
            Some(CallbackAction::Cancel) => self.handle_cancel_command(user_id, chat_id).await,
            None => {
                tracing::warn!(user_id, data, "Unknown callback payload");
                vec![]
            }
        }
    }

    async fn dispatch(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        event: Event,
        display_name: Option<&str>,
    ) -> Vec<OutboundMessage> {
        let (handle, _created) = self.sessions.get_or_create(user_id, chat_id).await;
        {
            let mut session = handle.lock().await;
            session.chat_id = chat_id;
            if let Some(name) = display_name {
                session.display_name = Some(name.to_string());
            }
        }

        let outbound = self.executor.run(&handle, event).await;
        self.evict_if_finished(user_id, &handle).await;
        outbound
    }

    async fn evict_if_finished(&self, user_id: UserId, handle: &SessionHandle) {
        let (state, chat_id) = {
            let session = handle.lock().await;
            (session.state(), session.chat_id)
        };
        if state.is_terminal() && self.sessions.remove_if_current(user_id, handle).await {
            self.executor.forget_chat(chat_id);
            tracing::info!(
                user_id,
                state = %state,
                completed = (state == ConversationState::Complete),
                "Evicted finished session"
            );
        }
    }
}
