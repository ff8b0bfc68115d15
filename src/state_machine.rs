//! Dream interview state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Reply};
pub use event::Event;
pub use state::{
    CompletionPurpose, ConversationState, Interview, PendingCompletion, TransitionContext,
};
pub use transition::{on_enter, transition, TransitionError};
