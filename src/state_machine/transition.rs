//! Pure state transition function
//!
//! Given the same interview, context and event this always produces the same
//! new interview and effects. Gateway calls are requested as effects and
//! their outcome comes back as a later event.

use super::effect::{Effect, Reply};
use super::event::Event;
use super::state::{
    CompletionPurpose, ConversationState, Interview, PendingCompletion, TransitionContext,
};
use crate::dream::{ActorField, Dream, PairView};
use crate::list_parser::parse_list;
use crate::prompts;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: Interview,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: Interview) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    pub fn with_reply(self, reply: Reply) -> Self {
        self.with_effect(Effect::Reply(reply))
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A completion is in flight, cannot accept input")]
    Busy,
    #[error("Completion {0} is not the one this session is waiting for")]
    StaleCompletion(String),
}

/// Pure transition function
pub fn transition(
    interview: &Interview,
    context: &TransitionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        // ============================================================
        // Cancellation: accepted from any non-terminal state
        // ============================================================
        Event::Cancel => {
            if interview.state.is_terminal() {
                return Ok(TransitionResult::new(interview.clone()));
            }
            let mut next = interview.clone();
            next.state = ConversationState::Cancelled;
            next.pending = None;
            Ok(TransitionResult::new(next).with_reply(Reply::Cancelled))
        }

        // ============================================================
        // Gateway results
        // ============================================================
        Event::CompletionSucceeded { request_id, text } => {
            let pending = awaited(interview, &request_id)?;
            Ok(completion_succeeded(interview, pending, context, text))
        }

        Event::CompletionFailed { request_id, error } => {
            awaited(interview, &request_id)?;
            tracing::warn!(
                state = %interview.state,
                error = %error,
                retryable = error.kind.is_retryable(),
                "Completion failed, staying in state"
            );
            let mut next = interview.clone();
            next.pending = None;
            Ok(TransitionResult::new(next).with_reply(Reply::GatewayFailure))
        }

        // ============================================================
        // User input
        // ============================================================
        Event::UserText { .. } | Event::Advance if interview.state.is_terminal() => {
            Ok(TransitionResult::new(interview.clone()))
        }

        Event::UserText { .. } | Event::Advance if interview.is_busy() => {
            Err(TransitionError::Busy)
        }

        Event::UserText { text } => Ok(user_text(interview, &text)),

        Event::Advance => Ok(advance(interview, context)),
    }
}

/// Entry behavior of `state`: the replies it opens with and, for
/// INTERPRETATION, the completion it starts
pub fn on_enter(
    state: ConversationState,
    dream: &Dream,
    context: &TransitionContext,
) -> (Option<PendingCompletion>, Vec<Effect>) {
    let replies = match state {
        ConversationState::History => {
            if dream.narrative().trim().is_empty() {
                vec![Reply::HistoryInstructions]
            } else {
                vec![Reply::HistoryAck]
            }
        }
        ConversationState::Association => {
            if dream.associations().is_empty() {
                vec![Reply::NoSymbols]
            } else {
                vec![
                    Reply::AssociationIntro {
                        pending: dream
                            .unresolved_association_keys()
                            .into_iter()
                            .map(str::to_string)
                            .collect(),
                    },
                    association_prompt(dream),
                ]
            }
        }
        ConversationState::Personality => {
            if dream.actors().is_empty() {
                vec![Reply::NoActors]
            } else {
                vec![
                    Reply::PersonalityIntro {
                        actors: dream.actors().iter().map(|a| a.person().to_string()).collect(),
                    },
                    actor_prompt(dream, ActorField::Characteristic),
                ]
            }
        }
        ConversationState::Context => {
            vec![Reply::ContextIntro, actor_prompt(dream, ActorField::Context)]
        }
        ConversationState::Sense => {
            vec![Reply::SenseIntro, actor_prompt(dream, ActorField::Sense)]
        }
        ConversationState::Interpretation => {
            let pending = PendingCompletion::new(
                context.next_request_id.clone(),
                CompletionPurpose::Interpretation,
            );
            let effect = Effect::RequestCompletion {
                request_id: pending.request_id.clone(),
                purpose: CompletionPurpose::Interpretation,
                prompt: prompts::interpretation(dream),
            };
            return (Some(pending), vec![effect]);
        }
        ConversationState::Complete | ConversationState::Cancelled => vec![],
    };
    (None, replies.into_iter().map(Effect::Reply).collect())
}

fn awaited<'a>(
    interview: &'a Interview,
    request_id: &str,
) -> Result<&'a PendingCompletion, TransitionError> {
    match &interview.pending {
        Some(pending) if pending.request_id == request_id => Ok(pending),
        _ => Err(TransitionError::StaleCompletion(request_id.to_string())),
    }
}

/// Move to `state` and run its entry behavior
fn enter(
    mut next: Interview,
    state: ConversationState,
    context: &TransitionContext,
) -> TransitionResult {
    next.state = state;
    let (pending, effects) = on_enter(state, &next.dream, context);
    next.pending = pending;
    TransitionResult::new(next).with_effects(effects)
}

fn user_text(interview: &Interview, text: &str) -> TransitionResult {
    let answer = text.trim();
    let mut next = interview.clone();

    if answer.is_empty() {
        tracing::debug!(state = %interview.state, "Ignoring blank input");
    }

    let reply = match interview.state {
        ConversationState::History => {
            if !answer.is_empty() {
                next.dream.append_narrative(text);
            }
            if next.dream.narrative().trim().is_empty() {
                Reply::HistoryInstructions
            } else {
                Reply::HistoryAck
            }
        }
        ConversationState::Association => {
            if !answer.is_empty() {
                let key = next
                    .dream
                    .first_unresolved_association_key()
                    .map(str::to_string);
                if let Some(key) = key {
                    next.dream.set_association(&key, answer);
                }
            }
            association_prompt(&next.dream)
        }
        ConversationState::Personality | ConversationState::Context | ConversationState::Sense => {
            let Some(field) = interview.state.actor_field() else {
                return TransitionResult::new(next);
            };
            if !answer.is_empty() {
                next.dream.assign_to_next_actor_missing(field, answer);
            }
            actor_prompt(&next.dream, field)
        }
        // Only reachable after the interpretation request failed
        ConversationState::Interpretation => Reply::InterpretationNotReady,
        ConversationState::Complete | ConversationState::Cancelled => {
            return TransitionResult::new(next)
        }
    };

    TransitionResult::new(next).with_reply(reply)
}

fn advance(interview: &Interview, context: &TransitionContext) -> TransitionResult {
    let next = interview.clone();
    match interview.state {
        ConversationState::History => {
            let narrative = interview.dream.narrative();
            if narrative.trim().is_empty() {
                return TransitionResult::new(next).with_reply(Reply::HistoryInstructions);
            }
            request(
                next,
                PendingCompletion::new(context.next_request_id.clone(), CompletionPurpose::Symbols),
                prompts::symbols(narrative),
            )
        }
        ConversationState::Association => enter(next, ConversationState::Personality, context),
        ConversationState::Personality => enter(next, ConversationState::Context, context),
        ConversationState::Context => enter(next, ConversationState::Sense, context),
        // Entering INTERPRETATION again re-issues a request that failed
        ConversationState::Sense | ConversationState::Interpretation => {
            enter(next, ConversationState::Interpretation, context)
        }
        ConversationState::Complete | ConversationState::Cancelled => TransitionResult::new(next),
    }
}

fn request(mut next: Interview, pending: PendingCompletion, prompt: String) -> TransitionResult {
    let effect = Effect::RequestCompletion {
        request_id: pending.request_id.clone(),
        purpose: pending.purpose,
        prompt,
    };
    next.pending = Some(pending);
    TransitionResult::new(next).with_effect(effect)
}

fn completion_succeeded(
    interview: &Interview,
    pending: &PendingCompletion,
    context: &TransitionContext,
    text: String,
) -> TransitionResult {
    let mut next = interview.clone();
    next.pending = None;

    match pending.purpose {
        CompletionPurpose::Symbols => match parse_list(&text) {
            Ok(symbols) if !symbols.is_empty() => {
                let mut actors_request = PendingCompletion::new(
                    context.next_request_id.clone(),
                    CompletionPurpose::Actors,
                );
                actors_request.symbols = symbols;
                let prompt = prompts::actors(next.dream.narrative());
                request(next, actors_request, prompt)
            }
            parsed => {
                tracing::info!(?parsed, "No symbols extracted from narrative");
                TransitionResult::new(next).with_reply(Reply::ExtractionFailed { raw: text })
            }
        },
        CompletionPurpose::Actors => {
            let actors = parse_list(&text).unwrap_or_else(|e| {
                tracing::info!(error = %e, "No actors extracted from narrative");
                Vec::new()
            });
            next.dream.add_association_keys(pending.symbols.iter().cloned());
            next.dream.add_actors(actors);
            enter(next, ConversationState::Association, context)
        }
        CompletionPurpose::Interpretation => {
            next.dream.set_interpretation(text.clone());
            next.state = ConversationState::Complete;
            TransitionResult::new(next).with_reply(Reply::Interpretation { text })
        }
    }
}

fn association_prompt(dream: &Dream) -> Reply {
    match dream.first_unresolved_association_key() {
        Some(symbol) => Reply::AskAssociation {
            symbol: symbol.to_string(),
        },
        None => Reply::AssociationsDone {
            summary: dream.render_pairs(PairView::Associations),
        },
    }
}

fn actor_prompt(dream: &Dream, field: ActorField) -> Reply {
    let Some(actor) = dream.next_actor_missing(field) else {
        return match field {
            ActorField::Characteristic => Reply::CharacteristicsDone {
                summary: dream.render_pairs(PairView::PersonCharacteristic),
            },
            ActorField::Context => Reply::ContextSummary {
                summary: dream.render_pairs(PairView::CharacteristicContext),
            },
            ActorField::Sense => Reply::SenseSummary {
                summary: dream.render_pairs(PairView::CharacteristicSense),
            },
        };
    };

    // Awaiting context or sense implies the characteristic is set
    let characteristic = actor.characteristic().unwrap_or(actor.person()).to_string();
    match field {
        ActorField::Characteristic => Reply::AskCharacteristic {
            person: actor.person().to_string(),
        },
        ActorField::Context => Reply::AskContext { characteristic },
        ActorField::Sense => Reply::AskSense { characteristic },
    }
}
