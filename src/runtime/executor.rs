//! Drives one session through a transition and its effects
//!
//! The session lock is held while a transition runs and released while a
//! completion is awaited, so a cancel from the same user can get in between.
//! The completion result is fed back as an event; if the session moved on in
//! the meantime the transition rejects it as stale and it is dropped.

use crate::composer::{OutboundMessage, ResponseComposer};
use crate::llm::{LlmRequest, LlmService};
use crate::session::{ChatId, Session, SessionHandle};
use crate::state_machine::{
    transition, CompletionPurpose, Effect, Event, Reply, TransitionContext, TransitionError,
};
use std::sync::Arc;

/// A completion the executor has to run outside the session lock
struct OutstandingRequest {
    request_id: String,
    purpose: CompletionPurpose,
    request: LlmRequest,
}

pub struct SessionExecutor {
    gateway: Arc<dyn LlmService>,
    composer: ResponseComposer,
}

impl SessionExecutor {
    pub fn new(gateway: Arc<dyn LlmService>, composer: ResponseComposer) -> Self {
        Self { gateway, composer }
    }

    pub fn model_id(&self) -> &str {
        self.gateway.model_id()
    }

    /// Drop the gateway's history for a chat so the next dream starts clean
    pub fn forget_chat(&self, chat_id: ChatId) {
        self.gateway.forget(&chat_id.to_string());
    }

    /// Apply `event` and keep executing effects until no completion is
    /// outstanding. Returns every message produced along the way.
    pub async fn run(&self, handle: &SessionHandle, event: Event) -> Vec<OutboundMessage> {
        let mut outbound = Vec::new();
        let mut next_event = Some(event);

        while let Some(event) = next_event.take() {
            let outstanding = {
                let mut session = handle.lock().await;
                let effects = Self::apply(&mut session, event);
                self.execute_effects(&session, effects, &mut outbound)
            };

            if let Some(outstanding) = outstanding {
                next_event = Some(self.complete(outstanding).await);
            }
        }

        outbound
    }

    /// Run the transition and store the new interview
    pub fn apply(session: &mut Session, event: Event) -> Vec<Effect> {
        let kind = event.kind();
        let previous = session.state();

        match transition(&session.interview, &TransitionContext::fresh(), event) {
            Ok(result) => {
                session.interview = result.new_state;
                session.touch();
                if session.state() != previous {
                    tracing::info!(
                        user_id = session.user_id,
                        from = %previous,
                        to = %session.state(),
                        event = kind,
                        "State changed"
                    );
                }
                result.effects
            }
            Err(TransitionError::Busy) => {
                tracing::info!(user_id = session.user_id, event = kind, "Session busy");
                vec![Effect::Reply(Reply::StillWorking)]
            }
            Err(TransitionError::StaleCompletion(request_id)) => {
                tracing::info!(
                    user_id = session.user_id,
                    %request_id,
                    state = %session.state(),
                    "Discarding completion for a request that is no longer awaited"
                );
                vec![]
            }
        }
    }

    fn execute_effects(
        &self,
        session: &Session,
        effects: Vec<Effect>,
        outbound: &mut Vec<OutboundMessage>,
    ) -> Option<OutstandingRequest> {
        let mut outstanding = None;
        for effect in effects {
            match effect {
                Effect::Reply(reply) => {
                    outbound.extend(self.composer.render(session.chat_id, &reply));
                }
                Effect::RequestCompletion {
                    request_id,
                    purpose,
                    prompt,
                } => {
                    let request = LlmRequest::new(session.chat_id.to_string(), prompt)
                        .with_user_name(session.display_name.clone());
                    outstanding = Some(OutstandingRequest {
                        request_id,
                        purpose,
                        request,
                    });
                }
            }
        }
        outstanding
    }

    async fn complete(&self, outstanding: OutstandingRequest) -> Event {
        let OutstandingRequest {
            request_id,
            purpose,
            request,
        } = outstanding;

        tracing::debug!(%request_id, ?purpose, "Requesting completion");
        match self.gateway.complete(&request).await {
            Ok(response) => Event::CompletionSucceeded {
                request_id,
                text: response.text,
            },
            Err(error) => Event::CompletionFailed { request_id, error },
        }
    }
}
