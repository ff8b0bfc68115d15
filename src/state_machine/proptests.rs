//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::*;
use super::*;
use crate::dream::{ActorField, Dream};
use crate::llm::LlmError;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

/// User and gateway actions; gateway steps answer whatever is in flight
#[derive(Debug, Clone)]
enum Step {
    Text(String),
    Blank(String),
    Advance,
    Cancel,
    Answer(String),
    Fail,
    Stale(String),
}

fn to_event(interview: &Interview, step: Step) -> Event {
    let in_flight = interview
        .pending
        .as_ref()
        .map_or_else(|| "none".to_string(), |p| p.request_id.clone());
    match step {
        Step::Text(text) | Step::Blank(text) => Event::UserText { text },
        Step::Advance => Event::Advance,
        Step::Cancel => Event::Cancel,
        Step::Answer(text) => Event::CompletionSucceeded {
            request_id: in_flight,
            text,
        },
        Step::Fail => Event::CompletionFailed {
            request_id: in_flight,
            error: LlmError::network("connection reset"),
        },
        Step::Stale(id) => Event::CompletionSucceeded {
            request_id: format!("stale-{id}"),
            text: "[\"ghost\"]".to_string(),
        },
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_state() -> impl Strategy<Value = ConversationState> {
    prop_oneof![
        Just(ConversationState::History),
        Just(ConversationState::Association),
        Just(ConversationState::Personality),
        Just(ConversationState::Context),
        Just(ConversationState::Sense),
        Just(ConversationState::Interpretation),
        Just(ConversationState::Complete),
        Just(ConversationState::Cancelled),
    ]
}

fn arb_cursor_state() -> impl Strategy<Value = ConversationState> {
    prop_oneof![
        Just(ConversationState::Association),
        Just(ConversationState::Personality),
        Just(ConversationState::Context),
        Just(ConversationState::Sense),
    ]
}

fn arb_model_output() -> impl Strategy<Value = String> {
    prop_oneof![
        proptest::collection::vec("[a-z]{1,6}", 0..4)
            .prop_map(|items| format!("Sure: [\"{}\"]", items.join("\",\""))),
        "[a-zA-Z ]{0,20}",
    ]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => "[a-z]{1,10}".prop_map(Step::Text),
        1 => "[ \t\n]{0,3}".prop_map(Step::Blank),
        2 => Just(Step::Advance),
        1 => Just(Step::Cancel),
        3 => arb_model_output().prop_map(Step::Answer),
        1 => Just(Step::Fail),
        1 => "[a-z]{4}".prop_map(Step::Stale),
    ]
}

/// A dream with symbols and actors in every stage of annotation
fn arb_dream() -> impl Strategy<Value = Dream> {
    (
        "[a-z ]{0,30}",
        proptest::collection::vec(("[a-z]{1,5}", proptest::option::of("[a-z]{1,5}")), 0..4),
        proptest::collection::vec(("[a-z]{1,5}", 0usize..4), 0..4),
    )
        .prop_map(|(narrative, symbols, actors)| {
            let mut dream = Dream::new();
            dream.append_narrative(&narrative);
            for (symbol, association) in symbols {
                dream.add_association_keys([symbol.clone()]);
                if let Some(value) = association {
                    dream.set_association(&symbol, value);
                }
            }
            for (person, filled) in actors {
                dream.add_actors([person]);
                for field in ActorField::ALL.iter().take(filled) {
                    dream.assign_to_next_actor_missing(*field, "x");
                }
            }
            dream
        })
}

fn arb_interview() -> impl Strategy<Value = Interview> {
    (arb_state(), arb_dream()).prop_map(|(state, dream)| Interview {
        state,
        dream,
        pending: None,
    })
}

// ============================================================================
// State Validity Checkers
// ============================================================================

/// A completion is requested exactly when the new state starts waiting on it
fn effects_are_valid(effects: &[Effect], new_state: &Interview) -> bool {
    let requests: Vec<_> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::RequestCompletion { request_id, .. } => Some(request_id),
            Effect::Reply(_) => None,
        })
        .collect();
    match (&new_state.pending, requests.as_slice()) {
        (None, []) => true,
        (Some(pending), [id]) => &pending.request_id == *id,
        _ => false,
    }
}

fn actor_fields_in_order(dream: &Dream) -> bool {
    dream.actors().iter().all(|actor| {
        ActorField::ALL.iter().all(|&field| {
            actor.get(field).is_none() || field.previous().map_or(true, |p| actor.get(p).is_some())
        })
    })
}

/// Nothing recorded earlier is lost or rewritten
fn dream_grows_monotonically(before: &Dream, after: &Dream) -> bool {
    after.narrative().starts_with(before.narrative())
        && after.associations().len() >= before.associations().len()
        && before.associations().iter().zip(after.associations()).all(|(old, new)| {
            old.symbol == new.symbol
                && (old.association.is_none() || old.association == new.association)
        })
        && after.actors().len() >= before.actors().len()
        && before.actors().iter().zip(after.actors()).all(|(old, new)| {
            old.person() == new.person()
                && ActorField::ALL
                    .iter()
                    .all(|&f| old.get(f).is_none() || old.get(f) == new.get(f))
        })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: Any event sequence keeps effects, pending and dream consistent
    #[test]
    fn prop_transitions_preserve_validity(steps in proptest::collection::vec(arb_step(), 0..30)) {
        let mut interview = Interview::new();

        for (i, step) in steps.into_iter().enumerate() {
            let event = to_event(&interview, step);
            match transition(&interview, &TransitionContext::new(format!("req-{i}")), event) {
                Ok(result) => {
                    prop_assert!(
                        effects_are_valid(&result.effects, &result.new_state),
                        "Invalid effects for {:?}: {:?}",
                        result.new_state,
                        result.effects
                    );
                    prop_assert!(dream_grows_monotonically(
                        &interview.dream,
                        &result.new_state.dream
                    ));
                    prop_assert!(actor_fields_in_order(&result.new_state.dream));
                    if result.new_state.state.is_terminal() {
                        prop_assert!(result.new_state.pending.is_none());
                    }
                    interview = result.new_state;
                }
                Err(_) => { /* Rejected events change nothing */ }
            }
        }
    }

    // Invariant 2: Cancel from any non-terminal state, busy or not, reaches CANCELLED
    #[test]
    fn prop_cancel_always_accepted(mut interview in arb_interview(), busy in any::<bool>()) {
        prop_assume!(!interview.state.is_terminal());
        if busy {
            interview.pending = Some(PendingCompletion::new("r1", CompletionPurpose::Symbols));
        }
        let result = transition(&interview, &TransitionContext::fresh(), Event::Cancel).unwrap();
        prop_assert_eq!(result.new_state.state, ConversationState::Cancelled);
        prop_assert!(result.new_state.pending.is_none());
        prop_assert_eq!(&result.new_state.dream, &interview.dream);
        prop_assert_eq!(result.effects, vec![Effect::Reply(Reply::Cancelled)]);
    }

    // Invariant 3: A session waiting on a completion rejects text and advance
    #[test]
    fn prop_busy_rejects_input(mut interview in arb_interview(), text in "[a-z]{0,10}") {
        prop_assume!(!interview.state.is_terminal());
        interview.pending = Some(PendingCompletion::new("r1", CompletionPurpose::Interpretation));
        let ctx = TransitionContext::fresh();
        prop_assert_eq!(
            transition(&interview, &ctx, Event::UserText { text }).unwrap_err(),
            TransitionError::Busy
        );
        prop_assert_eq!(
            transition(&interview, &ctx, Event::Advance).unwrap_err(),
            TransitionError::Busy
        );
    }

    // Invariant 4: Blank input in a cursor state never mutates and re-prompts
    #[test]
    fn prop_blank_input_is_idempotent(
        state in arb_cursor_state(),
        dream in arb_dream(),
        blank in "[ \t\n]{0,4}",
    ) {
        let interview = Interview { state, dream, pending: None };
        let ctx = TransitionContext::fresh();
        let first = transition(&interview, &ctx, Event::UserText { text: blank.clone() }).unwrap();
        prop_assert_eq!(&first.new_state, &interview);
        prop_assert_eq!(first.effects.len(), 1);

        let second = transition(&first.new_state, &ctx, Event::UserText { text: blank }).unwrap();
        prop_assert_eq!(&second.new_state, &interview);
        prop_assert_eq!(first.effects, second.effects);
    }

    // Invariant 5: Completions nobody waits for are rejected
    #[test]
    fn prop_stale_completion_rejected(interview in arb_interview(), id in "[a-z]{6}") {
        let event = Event::CompletionSucceeded { request_id: id.clone(), text: "[\"a\"]".into() };
        prop_assert_eq!(
            transition(&interview, &TransitionContext::fresh(), event).unwrap_err(),
            TransitionError::StaleCompletion(id)
        );
    }

    // Invariant 6: Terminal states are absorbing
    #[test]
    fn prop_terminal_states_absorb(
        dream in arb_dream(),
        step in arb_step(),
        cancelled in any::<bool>(),
    ) {
        let state = if cancelled {
            ConversationState::Cancelled
        } else {
            ConversationState::Complete
        };
        let interview = Interview { state, dream, pending: None };
        let event = to_event(&interview, step);
        if let Ok(result) = transition(&interview, &TransitionContext::fresh(), event) {
            prop_assert_eq!(&result.new_state, &interview);
            prop_assert!(result.effects.is_empty());
        }
    }

    // Invariant 7: Transport failures never touch the dream or the stage
    #[test]
    fn prop_gateway_failure_keeps_state(
        interview in arb_interview(),
        purpose in prop_oneof![
            Just(CompletionPurpose::Symbols),
            Just(CompletionPurpose::Actors),
            Just(CompletionPurpose::Interpretation),
        ],
    ) {
        prop_assume!(!interview.state.is_terminal());
        let mut busy = interview.clone();
        busy.pending = Some(PendingCompletion::new("r1", purpose));
        let event = Event::CompletionFailed {
            request_id: "r1".into(),
            error: LlmError::server_error("boom"),
        };
        let result = transition(&busy, &TransitionContext::fresh(), event).unwrap();
        prop_assert_eq!(&result.new_state, &interview);
        prop_assert_eq!(result.effects, vec![Effect::Reply(Reply::GatewayFailure)]);
    }
}
