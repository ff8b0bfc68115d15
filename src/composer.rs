//! Rendering of interview replies into outbound chat messages

use crate::session::ChatId;
use crate::state_machine::Reply;
use serde::Serialize;

// ============================================================================
// Outbound message types
// ============================================================================

/// A message for the chat transport to deliver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    /// Whether `text` uses Markdown formatting
    pub markdown: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<InlineKeyboard>,
}

impl OutboundMessage {
    pub fn plain(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            markdown: false,
            keyboard: None,
        }
    }

    pub fn markdown(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            markdown: true,
            ..Self::plain(chat_id, text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Inline keyboard, serialized as rows of buttons
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InlineKeyboard {
    rows: Vec<Vec<InlineButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    pub fn single_row(buttons: impl IntoIterator<Item = (&'static str, CallbackAction)>) -> Self {
        Self {
            rows: vec![buttons
                .into_iter()
                .map(|(text, action)| InlineButton {
                    text: text.to_string(),
                    callback_data: action.as_str().to_string(),
                })
                .collect()],
        }
    }

    /// Continue / Cancel
    pub fn continue_or_cancel() -> Self {
        Self::single_row([
            ("Continue ✅", CallbackAction::Next),
            ("Cancel ❌", CallbackAction::Cancel),
        ])
    }

    /// Shown under the interpretation
    pub fn finish() -> Self {
        Self::single_row([("Finish", CallbackAction::Cancel)])
    }
}

/// Fixed vocabulary of inline-keyboard callback payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Next,
    Cancel,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "NEXT" => Some(Self::Next),
            "CANCEL" => Some(Self::Cancel),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Next => "NEXT",
            Self::Cancel => "CANCEL",
        }
    }
}

// ============================================================================
// Texts
// ============================================================================

const GREETING: &str = "Hi! I will help you explore your dream the way Carl Jung would. \
We will go through its images and characters step by step.";

const HISTORY_DESCRIBE: &str = "Please describe your dream in as much detail as you can.";
const HISTORY_SEVERAL: &str = "You can do it in several messages.";
const HISTORY_WHEN_DONE: &str = "When you are done, press Continue.";
const HISTORY_ACK: &str = "Got it. Add more details, or press Continue when you are done.";

const EXTRACTION_FAILED: &str =
    "I could not pick out any images from your story. This is what I got:";
const GATEWAY_FAILURE: &str = "Something went wrong while analysing your dream. \
Press Continue to try again, or come back a little later.";
const STILL_WORKING: &str = "I am still working on your previous request, please wait a moment.";
const INTERPRETATION_NOT_READY: &str =
    "Your interpretation is not ready yet. Press Continue to try again.";

const ASSOCIATION_DESC_1: &str = "I picked out these images and objects from your story:";
const ASSOCIATION_DESC_2: &str = "Write what each image means to you in the context of the \
dream. If an image brings up several associations or memories, such as a particular person, \
word, phrase or situation, write all of them down.";
const ASSOCIATION_DESC_3: &str = "Don't worry about getting the associations right at this \
stage. The goal is to collect the direct associations each image evokes, even if they seem \
unrelated.";
const ASK_ASSOCIATION: &str = "Find associations for:";
const NO_SYMBOLS: &str = "I could not pick out any images from your story.";
const ASSOCIATIONS_END: &str = "These are your associations:";

const PERSONALITY_DESC_1: &str = "Now we will work with the characters of your dream:";
const PERSONALITY_DESC_2: &str = "Which trait of your personality is associated with each \
character?";
const NO_ACTORS: &str = "I could not pick out any characters from your story.";
const PERSONALITY_END: &str = "These are your characters:";

const CONTEXT_DESC: &str = "Now let's look at where these personality traits show up.";
const CONTEXT_END: &str = "Your personality traits show up:";
const SENSE_DESC: &str = "Now let's look at what these personality traits mean to you.";
const SENSE_END: &str = "These are the meanings of your personality traits:";

const PRESS_NEXT: &str = "That's all for this step. Press Continue to move on.";
const NOTHING_RECORDED: &str = "Nothing recorded.";
const CANCELLED: &str = "Analysis stopped.";

// ============================================================================
// Composer
// ============================================================================

/// Turns interview replies into transport-ready messages
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseComposer;

impl ResponseComposer {
    pub fn new() -> Self {
        Self
    }

    pub fn greeting(&self, chat_id: ChatId) -> OutboundMessage {
        OutboundMessage::plain(chat_id, GREETING)
    }

    pub fn render_all<'a>(
        &self,
        chat_id: ChatId,
        replies: impl IntoIterator<Item = &'a Reply>,
    ) -> Vec<OutboundMessage> {
        replies
            .into_iter()
            .flat_map(|reply| self.render(chat_id, reply))
            .collect()
    }

    pub fn render(&self, chat_id: ChatId, reply: &Reply) -> Vec<OutboundMessage> {
        let plain = |text: &str| OutboundMessage::plain(chat_id, text);
        let md = |text: String| OutboundMessage::markdown(chat_id, text);
        let keyboard = InlineKeyboard::continue_or_cancel;

        match reply {
            Reply::HistoryInstructions => vec![
                plain(HISTORY_DESCRIBE),
                plain(HISTORY_SEVERAL),
                plain(HISTORY_WHEN_DONE).with_keyboard(keyboard()),
            ],
            Reply::HistoryAck => vec![plain(HISTORY_ACK).with_keyboard(keyboard())],
            Reply::ExtractionFailed { raw } => {
                let mut messages = vec![plain(EXTRACTION_FAILED)];
                if !raw.trim().is_empty() {
                    messages.push(plain(raw));
                }
                messages
            }
            Reply::GatewayFailure => vec![plain(GATEWAY_FAILURE).with_keyboard(keyboard())],
            Reply::StillWorking => vec![plain(STILL_WORKING)],
            Reply::InterpretationNotReady => {
                vec![plain(INTERPRETATION_NOT_READY).with_keyboard(keyboard())]
            }

            Reply::AssociationIntro { pending } => vec![
                plain(&format!("{ASSOCIATION_DESC_1} {}", pending.join(", "))),
                plain(ASSOCIATION_DESC_2),
                plain(ASSOCIATION_DESC_3),
            ],
            Reply::AskAssociation { symbol } => vec![md(format!("{ASK_ASSOCIATION} *{symbol}*"))],
            Reply::NoSymbols => vec![plain(NO_SYMBOLS).with_keyboard(keyboard())],
            Reply::AssociationsDone { summary } => {
                self.summary(chat_id, ASSOCIATIONS_END, summary, Some(PRESS_NEXT))
            }

            Reply::PersonalityIntro { actors } => vec![
                plain(&format!("{PERSONALITY_DESC_1} {}", actors.join(", "))),
                plain(PERSONALITY_DESC_2),
            ],
            Reply::AskCharacteristic { person } => vec![md(format!("*{person}*"))],
            Reply::NoActors => vec![plain(NO_ACTORS).with_keyboard(keyboard())],
            Reply::CharacteristicsDone { summary } => {
                self.summary(chat_id, PERSONALITY_END, summary, Some(PRESS_NEXT))
            }

            Reply::ContextIntro => vec![plain(CONTEXT_DESC)],
            Reply::AskContext { characteristic } => vec![md(format!(
                "Where in your life does this trait show up: *{characteristic}*?"
            ))],
            Reply::ContextSummary { summary } => self.summary(chat_id, CONTEXT_END, summary, None),

            Reply::SenseIntro => vec![plain(SENSE_DESC)],
            Reply::AskSense { characteristic } => vec![md(format!(
                "What does this trait of yours mean to you: *{characteristic}*?"
            ))],
            Reply::SenseSummary { summary } => self.summary(chat_id, SENSE_END, summary, None),

            Reply::Interpretation { text } => {
                vec![plain(text).with_keyboard(InlineKeyboard::finish())]
            }
            Reply::Cancelled => vec![plain(CANCELLED)],
        }
    }

    /// Header, Markdown pair list and an optional closing hint; the last
    /// message carries the continue/cancel keyboard
    fn summary(
        &self,
        chat_id: ChatId,
        header: &str,
        pairs: &str,
        closing: Option<&str>,
    ) -> Vec<OutboundMessage> {
        let body = if pairs.is_empty() {
            OutboundMessage::plain(chat_id, NOTHING_RECORDED)
        } else {
            OutboundMessage::markdown(chat_id, pairs)
        };
        let mut messages = vec![OutboundMessage::plain(chat_id, header), body];
        if let Some(closing) = closing {
            messages.push(OutboundMessage::plain(chat_id, closing));
        }
        if let Some(last) = messages.last_mut() {
            last.keyboard = Some(InlineKeyboard::continue_or_cancel());
        }
        messages
    }
}
