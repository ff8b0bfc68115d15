//! Effects produced by state transitions

use super::state::CompletionPurpose;

/// What the interview wants to tell the user.
///
/// Carries data only; wording and keyboards are chosen by the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// How to describe the dream, sent while the narrative is empty
    HistoryInstructions,
    /// Narrative received, more may follow
    HistoryAck,
    /// Extraction succeeded but no list could be read; raw model output
    ExtractionFailed { raw: String },
    /// The completion backend could not be reached
    GatewayFailure,
    /// A completion for this session is still running
    StillWorking,
    /// Text sent while the interpretation is waiting for a retry
    InterpretationNotReady,

    AssociationIntro { pending: Vec<String> },
    AskAssociation { symbol: String },
    NoSymbols,
    AssociationsDone { summary: String },

    PersonalityIntro { actors: Vec<String> },
    AskCharacteristic { person: String },
    NoActors,
    CharacteristicsDone { summary: String },

    ContextIntro,
    AskContext { characteristic: String },
    ContextSummary { summary: String },

    SenseIntro,
    AskSense { characteristic: String },
    SenseSummary { summary: String },

    Interpretation { text: String },
    Cancelled,
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a reply to the user
    Reply(Reply),

    /// Call the completion gateway; the result comes back as an event
    RequestCompletion {
        request_id: String,
        purpose: CompletionPurpose,
        prompt: String,
    },
}

impl Effect {
    pub fn reply(reply: Reply) -> Self {
        Effect::Reply(reply)
    }

    pub fn as_reply(&self) -> Option<&Reply> {
        match self {
            Effect::Reply(reply) => Some(reply),
            Effect::RequestCompletion { .. } => None,
        }
    }
}
